/// URL parser state machine states
/// Based on the WHATWG URL Standard's basic URL parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Scheme start state
    SchemeStart,
    /// Scheme state
    Scheme,
    /// No scheme state
    NoScheme,
    /// Special relative or authority state
    SpecialRelativeOrAuthority,
    /// Path or authority state
    PathOrAuthority,
    /// Relative state
    Relative,
    /// Relative slash state
    RelativeSlash,
    /// Special authority slashes state
    SpecialAuthoritySlashes,
    /// Special authority ignore slashes state
    SpecialAuthorityIgnoreSlashes,
    /// Authority state
    Authority,
    /// Host state
    Host,
    /// Hostname state (host state entered via the hostname setter)
    Hostname,
    /// Port state
    Port,
    /// File state
    File,
    /// File slash state
    FileSlash,
    /// File host state
    FileHost,
    /// Path start state
    PathStart,
    /// Path state
    Path,
    /// Opaque path state (no-authority, non-special URLs)
    OpaquePath,
    /// Query state
    Query,
    /// Fragment state
    Fragment,
}
