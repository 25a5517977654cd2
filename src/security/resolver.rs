use super::{AuthRequirement, AuthSetting};

/// Effective requirement for an operation.
///
/// `chain` lists the owning routers' settings from the direct parent outward
/// to the root. The operation's own explicit setting wins outright; otherwise
/// the first explicit setting along the chain wins; otherwise no auth.
/// An explicit `AuthRequirement::None` counts as explicit.
pub fn resolve<'a, I>(local: &'a AuthSetting, chain: I) -> AuthRequirement
where
    I: IntoIterator<Item = &'a AuthSetting>,
{
    std::iter::once(local)
        .chain(chain)
        .find_map(|setting| match setting {
            AuthSetting::Explicit(requirement) => Some(requirement.clone()),
            AuthSetting::Unset => None,
        })
        .unwrap_or(AuthRequirement::None)
}
