use askama::Template;
use serde::Serialize;
use std::collections::HashSet;

use super::{format_date, script_json};
use crate::config::TreeConfig;
use crate::constants::VIS_NETWORK_JS;
use crate::error::Result;
use crate::ranker::Ranking;

/// One person in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Plain-text tooltip, one fact per line
    pub title: String,
}

/// Parent to child link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

#[derive(Template)]
#[template(path = "family_graph.html")]
struct GraphPage<'a> {
    title: &'a str,
    digest: &'a str,
    vis_network_js: &'a str,
    style: &'a TreeConfig,
    nodes_json: String,
    edges_json: String,
}

/// Nodes and edges of the family graph, in ranked order
#[derive(Debug, Clone)]
pub struct GraphDocument {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl GraphDocument {
    /// Emits one node per member and one edge per member whose parent is
    /// also a node. Parents promoted away (unknown names) get no edge.
    pub fn build(ranking: &Ranking<'_>) -> Self {
        let nodes: Vec<GraphNode> = ranking
            .members()
            .iter()
            .map(|member| {
                let record = member.record;
                let title = [
                    format!("Level: {}", member.level),
                    format!("Level Number: {}", member.level_number),
                    format!("Overall Number: {}", member.overall_number),
                    format!("DOB: {}", format_date(record.date_of_birth)),
                    format!("Email: {}", record.email.as_deref().unwrap_or("n/a")),
                ]
                .join("\n");
                GraphNode {
                    id: record.name.clone(),
                    label: record.name.clone(),
                    title,
                }
            })
            .collect();

        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for member in ranking.members() {
            let Some(parent) = member.record.parent.as_deref() else {
                continue;
            };
            if !ids.contains(parent) {
                continue;
            }
            let edge = GraphEdge {
                from: parent.to_string(),
                to: member.record.name.clone(),
            };
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }

        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Renders a standalone page that draws the graph with vis-network.
    pub fn render(&self, style: &TreeConfig, digest: &str) -> Result<String> {
        let page = GraphPage {
            title: "Family Tree",
            digest,
            vis_network_js: VIS_NETWORK_JS,
            style,
            nodes_json: script_json(&self.nodes)?,
            edges_json: script_json(&self.edges)?,
        };
        Ok(page.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{resolve_tree, DanglingParentPolicy};
    use crate::loader::load_from_bytes;
    use crate::ranker::rank;
    use crate::types::{FamilyTable, Variant};

    fn family(csv: &str) -> FamilyTable {
        load_from_bytes(csv.as_bytes(), Variant::Tree).unwrap()
    }

    #[test]
    fn test_nodes_and_edges() {
        let table = family(
            "Name,Parent,Date of Birth,Email\n\
             Alice,,1950-01-01,alice@example.com\n\
             Bob,Alice,1975-06-01,\n\
             Carol,Alice,1970-03-01,carol@example.com\n",
        );
        let resolution = resolve_tree(&table, DanglingParentPolicy::Error).unwrap();
        let ranking = rank(&table, &resolution.levels);
        let doc = GraphDocument::build(&ranking);

        let ids: Vec<&str> = doc.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Alice", "Carol", "Bob"]);
        assert_eq!(
            doc.nodes()[1].title,
            "Level: 1\nLevel Number: 1\nOverall Number: 2\nDOB: 1970-03-01\nEmail: carol@example.com"
        );
        assert!(doc.nodes()[2].title.ends_with("Email: n/a"));

        assert_eq!(
            doc.edges(),
            &[
                GraphEdge { from: "Alice".into(), to: "Carol".into() },
                GraphEdge { from: "Alice".into(), to: "Bob".into() },
            ]
        );
    }

    #[test]
    fn test_promoted_root_has_no_edge() {
        let table = family("Name,Parent,Date of Birth\nAlice,,1950-01-01\nBob,Ghost,1975-06-01\n");
        let resolution = resolve_tree(&table, DanglingParentPolicy::Root).unwrap();
        let ranking = rank(&table, &resolution.levels);
        let doc = GraphDocument::build(&ranking);

        assert_eq!(doc.nodes().len(), 2);
        assert!(doc.edges().is_empty());
    }

    #[test]
    fn test_render_embeds_data() {
        let table = family(
            "Name,Parent,Date of Birth\nAlice,,1950-01-01\n\"Bob </script>\",Alice,1975-06-01\n",
        );
        let resolution = resolve_tree(&table, DanglingParentPolicy::Error).unwrap();
        let ranking = rank(&table, &resolution.levels);
        let html = GraphDocument::build(&ranking)
            .render(&TreeConfig::default(), &table.digest)
            .unwrap();

        assert!(html.contains("vis-network.min.js"));
        assert!(html.contains("height: 750px"));
        assert!(html.contains(&table.digest));
        assert!(html.contains(r#""from":"Alice""#));
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
