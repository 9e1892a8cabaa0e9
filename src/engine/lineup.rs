use crate::feed::types::{Action, ActionKind, PlayerId, SubDirection, TeamId};
use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const LINEUP_SIZE: usize = 5;

/// Consecutive substitutions for one team at one `(period, clock)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionBatch {
    pub team_id: TeamId,
    pub period: Option<u8>,
    pub clock: String,
    pub outs: Vec<PlayerId>,
    pub ins: Vec<PlayerId>,
}

impl SubstitutionBatch {
    /// Collects the batch starting at `actions[start]`, which must be a
    /// substitution. Returns the batch (if the first action names a team)
    /// and the index of the first action after it.
    pub fn collect(actions: &[Action], start: usize) -> (Option<SubstitutionBatch>, usize) {
        let Some(first) = actions.get(start) else {
            return (None, start);
        };
        let Some(team_id) = first.team_id else {
            return (None, start + 1);
        };
        let mut batch = SubstitutionBatch {
            team_id,
            period: first.period,
            clock: first.clock.clone(),
            outs: Vec::new(),
            ins: Vec::new(),
        };
        let mut next = start;
        while let Some(action) = actions.get(next) {
            let ActionKind::Substitution { direction } = action.kind else { break };
            if action.team_id != Some(team_id) || action.period != batch.period || action.clock != batch.clock {
                break;
            }
            match (direction, action.person_id) {
                (Some(SubDirection::Out), Some(pid)) => batch.outs.push(pid),
                (Some(SubDirection::In), Some(pid)) => batch.ins.push(pid),
                _ => {}
            }
            next += 1;
        }
        (Some(batch), next)
    }
}

/// Live on-court players for both teams.
#[derive(Debug, Clone)]
pub struct LineupTracker {
    lineups: BTreeMap<TeamId, BTreeSet<PlayerId>>,
}

impl LineupTracker {
    /// Seeds both lineups from the pre-game starters. A starters entry for a
    /// team not playing in the game is a structural defect.
    pub fn from_starters(
        home_team_id: TeamId,
        away_team_id: TeamId,
        starters: &HashMap<TeamId, Vec<PlayerId>>,
    ) -> Result<Self> {
        if let Some(stray) = starters.keys().find(|t| **t != home_team_id && **t != away_team_id) {
            bail!("starters listed for team {stray}, which is not in this game");
        }
        let mut lineups = BTreeMap::new();
        for team_id in [home_team_id, away_team_id] {
            let set: BTreeSet<PlayerId> = starters
                .get(&team_id)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            if set.len() != LINEUP_SIZE {
                tracing::warn!(team_id, starters = set.len(), "starting lineup is not five players");
            }
            lineups.insert(team_id, set);
        }
        Ok(Self { lineups })
    }

    pub fn lineup(&self, team_id: TeamId) -> Option<&BTreeSet<PlayerId>> {
        self.lineups.get(&team_id)
    }

    pub fn is_full(&self, team_id: TeamId) -> bool {
        self.lineup(team_id).is_some_and(|l| l.len() == LINEUP_SIZE)
    }

    /// `(team, player)` for every player currently on court.
    pub fn on_court(&self) -> impl Iterator<Item = (TeamId, PlayerId)> + '_ {
        self.lineups
            .iter()
            .flat_map(|(team, players)| players.iter().map(move |p| (*team, *p)))
    }

    /// Lineup the batch would produce: all outs first, then all ins.
    fn resolve(&self, batch: &SubstitutionBatch) -> Option<BTreeSet<PlayerId>> {
        let mut next = self.lineups.get(&batch.team_id)?.clone();
        for pid in &batch.outs {
            next.remove(pid);
        }
        next.extend(batch.ins.iter().copied());
        Some(next)
    }

    /// Whether applying the batch would alter the team's lineup.
    pub fn changes_lineup(&self, batch: &SubstitutionBatch) -> bool {
        match (self.resolve(batch), self.lineups.get(&batch.team_id)) {
            (Some(next), Some(current)) => next != *current,
            _ => false,
        }
    }

    /// Applies the batch. Only explicit in/out deltas are used, so a partial
    /// period-start batch never wipes a lineup. Returns whether the lineup
    /// changed; batches for a team not in the game are ignored.
    pub fn apply(&mut self, batch: &SubstitutionBatch) -> bool {
        let Some(next) = self.resolve(batch) else {
            tracing::warn!(team_id = batch.team_id, "substitution for a team not in this game, skipping");
            return false;
        };
        if next.len() > LINEUP_SIZE {
            tracing::warn!(
                team_id = batch.team_id,
                period = ?batch.period,
                clock = %batch.clock,
                size = next.len(),
                "lineup exceeds five players after substitution"
            );
        } else if next.len() < LINEUP_SIZE {
            tracing::debug!(
                team_id = batch.team_id,
                period = ?batch.period,
                clock = %batch.clock,
                size = next.len(),
                "lineup short after substitution"
            );
        }
        let Some(current) = self.lineups.get_mut(&batch.team_id) else {
            return false;
        };
        let changed = *current != next;
        *current = next;
        changed
    }

    /// Sorted five-man lineup, or `None` when the team is not at five.
    pub fn sorted_five(&self, team_id: TeamId) -> Option<[PlayerId; LINEUP_SIZE]> {
        let lineup = self.lineups.get(&team_id)?;
        let ids: Vec<PlayerId> = lineup.iter().copied().collect();
        ids.try_into().ok()
    }
}
