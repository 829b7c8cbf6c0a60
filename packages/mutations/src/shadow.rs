//! Default placeholder selection: a closed mapping from a parameter's
//! declared type to the block type instantiated into a freshly revealed,
//! unconnected socket.

/// Block type to use as default placeholder content for a declared parameter
/// type. `None` means the socket is left empty.
pub fn shadow_block_for_type(ty: &str) -> Option<&'static str> {
    match ty {
        "number" => Some("math_number"),
        "boolean" => Some("logic_boolean"),
        "string" => Some("text"),
        _ if is_array_type(ty) => Some("lists_create_with"),
        _ => None,
    }
}

fn is_array_type(ty: &str) -> bool {
    ty.ends_with("[]") || ty.starts_with("Array<")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_types_map_to_literals() {
        assert_eq!(shadow_block_for_type("number"), Some("math_number"));
        assert_eq!(shadow_block_for_type("boolean"), Some("logic_boolean"));
        assert_eq!(shadow_block_for_type("string"), Some("text"));
    }

    #[test]
    fn test_array_like_types_map_to_list_constructor() {
        assert_eq!(shadow_block_for_type("number[]"), Some("lists_create_with"));
        assert_eq!(
            shadow_block_for_type("Array<string>"),
            Some("lists_create_with")
        );
    }

    #[test]
    fn test_unknown_types_get_no_placeholder() {
        assert_eq!(shadow_block_for_type("Sprite"), None);
        assert_eq!(shadow_block_for_type(""), None);
    }
}
