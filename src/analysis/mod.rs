// Analysis — roster filtering, year trends, co-authorship graph, term statistics.

pub mod filter;
pub mod graph;
pub mod terms;
pub mod trends;
