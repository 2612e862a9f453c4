/// Details of the HTTP request in flight when an exception surfaced.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub uri: String,
    pub referrer: String,
    pub client_ip: String,
    /// Display name of the authenticated account, or "anonymous".
    pub user_name: String,
}

/// Request-scoped marker for the authenticated account, attached to request
/// extensions by the host application's auth layer.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);
