
use crate::SelectOptions;
use pretty_assertions::assert_eq;

#[test]
fn test_default_options() {
    let options = SelectOptions::default();
    assert!(options.strict_arg_markers);
    assert_eq!(options.frame_align, 8);
    assert!(!options.show_ir_comments);
}

#[test]
fn test_options_from_partial_json() {
    let options: SelectOptions = serde_json::from_str(r#"{ "strict_arg_markers": false }"#).unwrap();
    assert_eq!(
        options,
        SelectOptions {
            strict_arg_markers: false,
            ..SelectOptions::default()
        }
    );
}
