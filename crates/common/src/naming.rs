//! Identifier case conversion used when allocating derived names

/// Words reserved by the generated target language
const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // Break before an uppercase letter that follows a lowercase letter or
            // digit, or that starts a new word inside an acronym run (HTTPServer)
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_alphanumeric() {
            result.push(ch);
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }

    while result.contains("__") {
        result = result.replace("__", "_");
    }

    result.trim_matches('_').to_string()
}

/// Split a name into words on separators and lower-to-upper case boundaries
fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in s.chars() {
        if !ch.is_ascii_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Convert a name to PascalCase, keeping the inner casing of each word
///
/// `user_profile` and `user-profile` become `UserProfile`; `userProfile` stays
/// recognizable as `UserProfile`.
pub fn to_pascal_case(s: &str) -> String {
    let joined: String = words(s).iter().map(|w| capitalize(w)).collect();
    if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", joined)
    } else {
        joined
    }
}

/// Convert a name to camelCase
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// camelCase identifier that never collides with a reserved word
pub fn to_variable_name(s: &str) -> String {
    let name = to_camel_case(s);
    if RESERVED_WORDS.contains(&name.as_str()) {
        format!("{}Value", name)
    } else {
        name
    }
}

/// Human readable label: `clientSecret` and `client_secret` become `Client Secret`
pub fn format_label(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| {
            let lower = w.to_lowercase();
            capitalize(&lower)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("PodName"), "pod_name");
        assert_eq!(to_snake_case("listUsers"), "list_users");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("api-key"), "api_key");
        assert_eq!(to_snake_case("/items/{id}"), "items_id");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(to_pascal_case("user-profile"), "UserProfile");
        assert_eq!(to_pascal_case("userProfile"), "UserProfile");
        assert_eq!(to_pascal_case("Pet Store API"), "PetStoreAPI");
        assert_eq!(to_pascal_case("2fa"), "_2fa");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("get_items_by_id"), "getItemsById");
        assert_eq!(to_camel_case("listUsers"), "listUsers");
        assert_eq!(to_camel_case("X-API-KEY"), "xAPIKEY");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_to_variable_name_avoids_reserved_words() {
        assert_eq!(to_variable_name("class"), "classValue");
        assert_eq!(to_variable_name("default"), "defaultValue");
        assert_eq!(to_variable_name("user_id"), "userId");
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label("clientSecret"), "Client Secret");
        assert_eq!(format_label("http_username"), "Http Username");
        assert_eq!(format_label("baseUrl"), "Base Url");
    }
}
