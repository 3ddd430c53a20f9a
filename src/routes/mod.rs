/// Router Module Index
///
/// Splits routes by the access the security policy grants them. The split is
/// organisational only: the security filter layered over the whole router is
/// what enforces access, so a route added to the wrong module is still covered
/// by the catch-all authenticated rule.

/// Routes the policy leaves open (`/usuarios/login`, `/usuarios/register`).
pub mod public;

/// Routes that receive a resolved `Principal`.
pub mod authenticated;
