//! Recipe flow graphs: dependency edges between the entity tokens of a recipe.
//!
//! Every entity token is paired with one governor. The governor is picked with
//! the likelihood prior over governor categories: the nearest following token
//! of the most likely category, else the nearest preceding one, else the next
//! token in order. The last token with no candidate becomes a root and governs
//! itself. Each pair is then labeled by the [`DependencyPredictor`].

pub mod category;
pub mod likelihood;
pub mod predictor;

use std::collections::BTreeMap;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::error::Result;
use crate::paths;
use crate::token::TaggedToken;

pub use category::CategoryMap;
pub use likelihood::{Likelihood, RELATION_ROWS};
pub use predictor::{DependencyPredictor, LinearSvcPredictor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// A dependent/governor pair of composite token ids (`"<position>-<surface>"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPair {
    pub dependent: String,
    pub governor: String,
}

/// Leading numeric part of a composite token id.
fn numeric_prefix(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

pub struct FlowGraphBuilder<'a, P: DependencyPredictor + ?Sized> {
    likelihood: &'a Likelihood,
    categories: &'a CategoryMap,
    predictor: &'a P,
}

impl<'a, P: DependencyPredictor + ?Sized> FlowGraphBuilder<'a, P> {
    pub fn new(likelihood: &'a Likelihood, categories: &'a CategoryMap, predictor: &'a P) -> Self {
        Self {
            likelihood,
            categories,
            predictor,
        }
    }

    /// Entity tokens in text order.
    fn graph_tokens<'t>(tokens: &'t [TaggedToken]) -> Vec<&'t TaggedToken> {
        let mut ordered: Vec<&TaggedToken> = tokens.iter().filter(|t| t.label.is_some()).collect();
        ordered.sort_by_key(|t| t.position);
        ordered
    }

    /// Governor index for every token in `ordered`; a root governs itself.
    fn governors(&self, ordered: &[&TaggedToken]) -> Result<Vec<usize>> {
        let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, token) in ordered.iter().enumerate() {
            if let Some(label) = token.label() {
                by_label.entry(label).or_default().push(i);
            }
        }

        let mut governors = Vec::with_capacity(ordered.len());
        for (i, token) in ordered.iter().enumerate() {
            let code = self.categories.code(token.label().unwrap_or_default())?;
            let mut chosen = None;
            if let Some(ranked) = self.likelihood.ranked_governors(code) {
                // Every ranked code must map, not only those tried before a match.
                let labels = ranked
                    .into_iter()
                    .map(|governor_code| self.categories.label(governor_code))
                    .collect::<Result<Vec<&str>>>()?;
                for label in labels {
                    let Some(candidates) = by_label.get(label) else {
                        continue;
                    };
                    let after = candidates.iter().copied().find(|&j| j > i);
                    let before = candidates.iter().rev().copied().find(|&j| j < i);
                    if let Some(j) = after.or(before) {
                        chosen = Some(j);
                        break;
                    }
                }
            }
            let governor = chosen.unwrap_or(if i + 1 < ordered.len() { i + 1 } else { i });
            governors.push(governor);
        }
        Ok(governors)
    }

    /// The (dependent, governor) pairs, one per entity token, in text order.
    pub fn dependencies(&self, tokens: &[TaggedToken]) -> Result<Vec<DependencyPair>> {
        let ordered = Self::graph_tokens(tokens);
        let governors = self.governors(&ordered)?;
        Ok(ordered
            .iter()
            .zip(governors)
            .map(|(dep, gov)| DependencyPair {
                dependent: dep.composite_id(),
                governor: ordered[gov].composite_id(),
            })
            .collect())
    }

    pub fn build(&self, tokens: &[TaggedToken]) -> Result<FlowGraph> {
        let ordered = Self::graph_tokens(tokens);
        let governors = self.governors(&ordered)?;

        let mut graph: DiGraph<&TaggedToken, String> = DiGraph::with_capacity(ordered.len(), ordered.len());
        let nodes: Vec<NodeIndex> = ordered.iter().map(|t| graph.add_node(*t)).collect();
        for (i, gov) in governors.into_iter().enumerate() {
            let label = self.predictor.predict(ordered[i], ordered[gov])?;
            graph.add_edge(nodes[i], nodes[gov], label);
        }

        let graph_nodes = graph
            .node_indices()
            .map(|idx| {
                let token = graph[idx];
                GraphNode {
                    id: token.position.to_string(),
                    name: format!("{}-{}", token.surface, token.label().unwrap_or_default()),
                }
            })
            .collect();

        let links = graph
            .edge_references()
            .map(|edge| {
                let source = graph[edge.source()].composite_id();
                let target = graph[edge.target()].composite_id();
                GraphLink {
                    source: numeric_prefix(&source).to_string(),
                    target: numeric_prefix(&target).to_string(),
                    label: edge.weight().clone(),
                }
            })
            .collect();

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built flow graph"
        );
        Ok(FlowGraph {
            nodes: graph_nodes,
            links,
        })
    }
}

/// The frozen artifacts of the graph-data directory.
pub struct FlowGraphResources {
    pub likelihood: Likelihood,
    pub categories: CategoryMap,
    pub predictor: LinearSvcPredictor,
}

impl FlowGraphResources {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            likelihood: Likelihood::load(&dir.join(paths::LIKELIHOOD_FILE))?,
            categories: CategoryMap::load(&dir.join(paths::CATEGORY_FILE))?,
            predictor: LinearSvcPredictor::load(dir)?,
        })
    }

    pub fn build(&self, tokens: &[TaggedToken]) -> Result<FlowGraph> {
        FlowGraphBuilder::new(&self.likelihood, &self.categories, &self.predictor).build(tokens)
    }
}
