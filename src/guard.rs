use crate::dom::Element;

const TEXT_ENTRY_TAGS: [&str; 3] = ["input", "textarea", "select"];

/// Whether key events aimed at `target` belong to a text field.
///
/// `None` stands for a target that is not an element (the document itself,
/// for example) and is never a text field.
pub fn is_input_field(target: Option<&Element>) -> bool {
    let Some(el) = target else {
        return false;
    };
    let tag = el.tag.to_ascii_lowercase();
    TEXT_ENTRY_TAGS.contains(&tag.as_str()) || el.content_editable
}
