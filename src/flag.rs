use crate::store::{Flag, FlagPart, FlagVariant};

/// Compute a flag's effective value for an optional target audience.
///
/// Without a target the default variant's value is returned. With a target,
/// the non-default variant wins only if the target appears in its
/// `applies_to` allow-list; otherwise the default value stands. Targeting is
/// exact-match membership, not a percentage rollout.
pub fn evaluate(flag: &Flag, target: Option<&str>) -> bool {
    let (default_part, other_part) = variant_parts(flag);
    match target {
        Some(target) if other_part.applies_to.iter().any(|t| t == target) => other_part.value,
        _ => default_part.value,
    }
}

fn variant_parts(flag: &Flag) -> (&FlagPart, &FlagPart) {
    match flag.data.default_variant {
        FlagVariant::Blue => (&flag.data.blue, &flag.data.green),
        FlagVariant::Green => (&flag.data.green, &flag.data.blue),
    }
}
