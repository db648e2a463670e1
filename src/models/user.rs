/// Authenticated caller identity, resolved by the auth middleware before any
/// store access. Scopes every list/view/delete/upload operation.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
}
