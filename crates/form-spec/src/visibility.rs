use crate::spec::field::FormField;
use crate::spec::submission::Payload;
use crate::spec::template::FormTemplate;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Whether `field`'s required flag applies to `payload`. Fields without
/// conditions always apply; otherwise the conditional logic decides.
pub fn should_enforce_required(field: &FormField, payload: &Payload) -> bool {
    match &field.conditional_logic {
        Some(logic) if !logic.is_empty() => logic.evaluate(payload),
        _ => true,
    }
}

/// Active flag for every field of the template, keyed by `field_name`.
pub fn resolve_visibility(template: &FormTemplate, payload: &Payload) -> VisibilityMap {
    template
        .ordered_fields()
        .into_iter()
        .map(|field| {
            (
                field.field_name.clone(),
                should_enforce_required(field, payload),
            )
        })
        .collect()
}
