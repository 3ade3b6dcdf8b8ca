use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The inheritance/realization subgraph is not a DAG, so no level
    /// assignment exists. The diagram is left untouched.
    #[error("hierarchical links contain a cycle; layered layout cannot be applied")]
    CycleDetected,
}
