//! Assign scenes to groups and decide the visual order of groups

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use super::context::LayoutContext;
use super::types::*;

/// Run every group ordering step in sequence
pub fn order_groups(ctx: &mut LayoutContext) {
    assign_scene_groups(ctx);
    compute_group_appearances(ctx);
    sort_groups(ctx);
    let counts: Vec<usize> = ctx
        .groups_in_order()
        .iter()
        .map(|g| ctx.groups[g.0].median_count)
        .collect();
    debug!(?counts, "ordered groups by scene count");
}

/// The most frequent group in a first-seen tally.
///
/// On a tie the last group reaching the maximum wins.
pub fn mode_group(tally: &[(GroupId, usize)]) -> Option<GroupId> {
    let mut best: Option<(GroupId, usize)> = None;
    for &(group, count) in tally {
        match best {
            Some((_, max)) if count < max => {}
            _ => best = Some((group, count)),
        }
    }
    best.map(|(group, _)| group)
}

/// Give every scene the mode group of its characters
pub fn assign_scene_groups(ctx: &mut LayoutContext) {
    for scene_index in 0..ctx.scenes.len() {
        let mut tally: Vec<(GroupId, usize)> = Vec::new();
        for &appearance in &ctx.scenes[scene_index].appearances {
            let group = ctx.group_of(appearance);
            match tally.iter_mut().find(|(g, _)| *g == group) {
                Some((_, count)) => *count += 1,
                None => tally.push((group, 1)),
            }
        }
        if let Some(group) = mode_group(&tally) {
            ctx.scenes[scene_index].group = group;
            ctx.groups[group.0].median_count += 1;
        }
    }
}

/// Collect the unique characters of the scenes assigned to each group
pub fn compute_group_appearances(ctx: &mut LayoutContext) {
    let mut seen: Vec<HashSet<CharacterId>> = vec![HashSet::new(); ctx.groups.len()];
    for scene in &ctx.scenes {
        let group = scene.group.0;
        for &appearance in &scene.appearances {
            let character = ctx.appearances[appearance.0].character;
            if seen[group].insert(character) {
                ctx.groups[group].appearances.push(character);
            }
        }
    }
}

/// Assign each group its visual `order`.
///
/// Groups are ranked by scene count, then dealt alternately to the front and
/// back of the ranking: highest first, lowest second, second-highest third.
pub fn sort_groups(ctx: &mut LayoutContext) {
    let mut ranked: Vec<GroupId> = (0..ctx.groups.len()).map(GroupId).collect();
    ranked.sort_by(|a, b| ctx.groups[b.0].median_count.cmp(&ctx.groups[a.0].median_count));

    let mut queue: VecDeque<GroupId> = ranked.into();
    let mut from_back = false;
    let mut order = 0;
    while let Some(group) = if from_back {
        queue.pop_back()
    } else {
        queue.pop_front()
    } {
        ctx.groups[group.0].order = order;
        order += 1;
        from_back = !from_back;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConfig;
    use pretty_assertions::assert_eq;

    fn with_counts(counts: &[usize]) -> LayoutContext {
        let mut ctx = LayoutContext::new(LayoutConfig::default());
        for (community, &count) in counts.iter().enumerate() {
            let mut group = Group::new(community);
            group.median_count = count;
            ctx.groups.push(group);
        }
        ctx
    }

    fn orders(ctx: &LayoutContext) -> Vec<usize> {
        ctx.groups.iter().map(|g| g.order).collect()
    }

    #[test]
    fn test_mode_group_prefers_highest_count() {
        let tally = [(GroupId(0), 1), (GroupId(1), 3), (GroupId(2), 2)];
        assert_eq!(mode_group(&tally), Some(GroupId(1)));
    }

    #[test]
    fn test_mode_group_tie_goes_to_last() {
        let tally = [(GroupId(2), 2), (GroupId(0), 2), (GroupId(1), 1)];
        assert_eq!(mode_group(&tally), Some(GroupId(0)));
        assert_eq!(mode_group(&[]), None);
    }

    #[test]
    fn test_sort_groups_alternates_ends() {
        // Ranked: g1(5), g3(4), g0(3), g2(1)
        let mut ctx = with_counts(&[3, 5, 1, 4]);
        sort_groups(&mut ctx);
        // g1 -> 0, g2 -> 1, g3 -> 2, g0 -> 3
        assert_eq!(orders(&ctx), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_sort_groups_is_stable_on_ties() {
        let mut ctx = with_counts(&[2, 2, 2]);
        sort_groups(&mut ctx);
        assert_eq!(orders(&ctx), vec![0, 2, 1]);
    }

    #[test]
    fn test_sort_groups_single_and_empty() {
        let mut ctx = with_counts(&[7]);
        sort_groups(&mut ctx);
        assert_eq!(orders(&ctx), vec![0]);

        let mut ctx = with_counts(&[]);
        sort_groups(&mut ctx);
        assert!(ctx.groups.is_empty());
    }
}
