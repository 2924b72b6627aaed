use crate::error::AuthzError;
use cedar_policy::{ParseErrors, PolicySet};

/// Compile Cedar policy text into a `PolicySet`.
///
/// Any Cedar parse errors are mapped into `AuthzError::ParseError`.
///
/// Example:
/// ```rust
/// use residual_authz::compile_policy;
/// let policy_text = r#"
///     permit (principal, action == Action::"read", resource == Resource::"orders")
///     when { context.order.createdBy == principal.id };
///     forbid (principal == User::"mallory", action, resource);
/// "#;
/// let set = compile_policy(policy_text).unwrap();
/// assert_eq!(set.policies().count(), 2);
/// ```
pub fn compile_policy(text: &str) -> Result<PolicySet, AuthzError> {
    text.parse()
        .map_err(|e: ParseErrors| AuthzError::ParseError(e.to_string()))
}
