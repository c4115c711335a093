//! Group characters into communities by how often they share scenes

use std::collections::HashMap;

use tracing::debug;

use super::context::LayoutContext;
use super::error::LayoutError;
use super::types::*;
use crate::cluster::{Edge, Louvain};

/// Co-occurrence graph over character arena indices.
///
/// Each scene adds one to the weight of every unordered pair of its
/// characters. Edges come out in first-seen order.
pub fn co_occurrence_edges(ctx: &LayoutContext) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut index: HashMap<(usize, usize), usize> = HashMap::new();

    for scene in &ctx.scenes {
        let members: Vec<usize> = scene
            .appearances
            .iter()
            .map(|&a| ctx.character_of(a).0)
            .collect();
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if a == b {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                match index.get(&key) {
                    Some(&slot) => edges[slot].weight += 1.0,
                    None => {
                        index.insert(key, edges.len());
                        edges.push(Edge::new(key.0, key.1, 1.0));
                    }
                }
            }
        }
    }
    edges
}

/// Run community detection and create one group per community
pub fn assign_groups(ctx: &mut LayoutContext) -> Result<(), LayoutError> {
    let edges = co_occurrence_edges(ctx);
    let edge_count = edges.len();

    let mut louvain = Louvain::new()
        .with_nodes(0..ctx.characters.len())
        .with_edges(edges)?;

    let hints: Vec<(usize, usize)> = ctx
        .characters
        .iter()
        .enumerate()
        .filter_map(|(index, c)| c.initial_group.map(|group| (index, group)))
        .collect();
    if !hints.is_empty() {
        louvain = louvain.with_initial_partition(hints)?;
    }

    let partition = louvain.run();

    let mut by_community: HashMap<usize, GroupId> = HashMap::new();
    for (node, community) in partition.iter() {
        let group = *by_community.entry(community).or_insert_with(|| {
            ctx.groups.push(Group::new(community));
            GroupId(ctx.groups.len() - 1)
        });
        ctx.characters[node].group = group;
        ctx.groups[group.0].characters.push(CharacterId(node));
    }

    debug!(
        characters = ctx.characters.len(),
        edges = edge_count,
        groups = ctx.groups.len(),
        "assigned groups"
    );
    Ok(())
}
