/// External content-relevance filter applied to HTML before the
/// fit-markdown/fit-html conversion. The concrete scoring/pruning
/// algorithm is an external collaborator's concern; the generator
/// only needs this narrow contract.
pub trait RelevantContentFilter: Send + Sync {
    /// Return the filtered HTML subset judged relevant.
    fn filter(&self, html: &str) -> String;
}
