//! Which operations serve which object class

use dataconnector_generator_common::{
    HttpMethod, OperationBindings, OperationDescriptor, TypeDescriptor,
};

/// Collection path of an endpoint: `/users/{id}` and `/users` both give `/users`
pub fn collection_path(endpoint: &str) -> &str {
    let trimmed = endpoint.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((head, last)) if is_placeholder(last) => head,
        _ => trimmed,
    }
}

/// True for `collection/{param}`
pub fn is_item_path(path: &str, collection: &str) -> bool {
    path.strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|segment| !segment.contains('/') && is_placeholder(segment))
        .unwrap_or(false)
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn find<'o, P>(
    operations: &'o [OperationDescriptor],
    methods: &[HttpMethod],
    predicate: P,
) -> Option<&'o OperationDescriptor>
where
    P: Fn(&OperationDescriptor) -> bool,
{
    methods.iter().find_map(|method| {
        operations
            .iter()
            .find(|op| op.method == *method && predicate(op))
    })
}

fn id(op: Option<&OperationDescriptor>) -> Option<String> {
    op.map(|op| op.operation_id.clone())
}

/// Bind operations by path shape under the class's `apiEndpoint`
pub fn bind_by_endpoint(endpoint: &str, operations: &[OperationDescriptor]) -> OperationBindings {
    let collection = collection_path(endpoint);
    let on_collection = |op: &OperationDescriptor| op.path.trim_end_matches('/') == collection;
    let on_item = |op: &OperationDescriptor| is_item_path(&op.path, collection);

    OperationBindings {
        search: id(find(operations, &[HttpMethod::Get], on_collection)),
        lookup: id(find(operations, &[HttpMethod::Get], on_item)),
        insert: id(find(operations, &[HttpMethod::Post], on_collection)),
        modify: id(find(operations, &[HttpMethod::Put, HttpMethod::Patch], on_item)),
        delete: id(find(operations, &[HttpMethod::Delete], on_item)),
    }
}

/// Bind operations whose payloads carry the class's source model
pub fn bind_by_model(schema_name: &str, operations: &[OperationDescriptor]) -> OperationBindings {
    let is_model = |ty: Option<&TypeDescriptor>| {
        ty.and_then(TypeDescriptor::reference_name) == Some(schema_name)
    };
    let body_is_model = |op: &OperationDescriptor| is_model(op.body_parameter().map(|p| &p.ty));
    let has_path_params = |op: &OperationDescriptor| op.path_parameters().next().is_some();

    let search = find(operations, &[HttpMethod::Get], |op| {
        op.response_type()
            .map(|ty| ty.is_list() && is_model(Some(ty.element())))
            .unwrap_or(false)
    });
    let lookup = find(operations, &[HttpMethod::Get], |op| {
        has_path_params(op) && is_model(op.response_type())
    });
    let insert = find(operations, &[HttpMethod::Post], |op| body_is_model(op));
    let modify = find(operations, &[HttpMethod::Put, HttpMethod::Patch], |op| {
        body_is_model(op) && has_path_params(op)
    });
    let item_path = lookup.or(modify).map(|op| op.path.as_str());
    let delete = find(operations, &[HttpMethod::Delete], |op| Some(op.path.as_str()) == item_path);

    OperationBindings {
        search: id(search),
        lookup: id(lookup),
        insert: id(insert),
        modify: id(modify),
        delete: id(delete),
    }
}
