/// Optional store features exercised by the suite.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capabilities {
    /// Supports listing keys by prefix.
    pub list: bool,
    /// Supports range retrieval via `span`.
    pub span: bool,
}

impl Capabilities {
    pub const fn with_list(mut self) -> Self {
        self.list = true;
        self
    }

    pub const fn with_span(mut self) -> Self {
        self.span = true;
        self
    }
}
