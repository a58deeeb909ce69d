use std::collections::{BTreeMap, BTreeSet};

use log::info;
use rand::seq::SliceRandom;

use super::TournamentEngine;
use crate::domain::{Team, TeamId, TeamStanding};
use crate::errors::EngineError;

/// Group label -> teams, iterated in label order
pub type Groups = BTreeMap<String, Vec<Team>>;

/// `A`, `B`, `C`, ... for the i-th group.
pub fn group_label(index: usize) -> String {
    char::from(b'A' + (index % 26) as u8).to_string()
}

impl TournamentEngine {
    /// Deal teams round-robin into the configured number of groups, after an
    /// unseeded shuffle when `shuffle` is set. Resets every standing to zero.
    pub fn divide_into_groups(&mut self, shuffle: bool) -> Groups {
        let number_of_groups = self.settings.number_of_groups.max(1);
        let mut order: Vec<usize> = (0..self.teams.len()).collect();

        if shuffle {
            order.shuffle(&mut rand::rng());
        }

        let mut groups = Groups::new();
        for (position, team_idx) in order.into_iter().enumerate() {
            let label = group_label(position % number_of_groups);
            let team = &mut self.teams[team_idx];
            team.group = Some(label.clone());
            groups.entry(label).or_default().push(team.clone());
        }

        self.initialize_standings();
        info!(
            "Divided {} teams into {} groups (shuffle: {})",
            self.teams.len(),
            groups.len(),
            shuffle
        );
        groups
    }

    /// Commit a caller-supplied partition. The union of the lists must be the
    /// registered team set exactly once; otherwise nothing is changed.
    pub fn assign_teams_to_groups(
        &mut self,
        partition: &BTreeMap<String, Vec<TeamId>>,
    ) -> Result<Groups, EngineError> {
        self.validate_partition(partition)?;

        for (label, team_ids) in partition {
            for team_id in team_ids {
                if let Some(team) = self.teams.iter_mut().find(|t| t.team_id == *team_id) {
                    team.group = Some(label.clone());
                }
            }
        }

        self.initialize_standings();
        info!("Assigned {} teams to {} groups manually", self.teams.len(), partition.len());
        Ok(self.groups())
    }

    /// Current partition rebuilt from the teams' labels.
    pub fn groups(&self) -> Groups {
        let mut groups = Groups::new();
        for team in &self.teams {
            if let Some(label) = &team.group {
                groups.entry(label.clone()).or_default().push(team.clone());
            }
        }
        groups
    }

    fn validate_partition(&self, partition: &BTreeMap<String, Vec<TeamId>>) -> Result<(), EngineError> {
        if let Some(label) = partition.keys().find(|label| label.trim().is_empty()) {
            return Err(EngineError::InvalidPartition(format!(
                "group label {:?} is empty",
                label
            )));
        }

        let known: BTreeSet<TeamId> = self.teams.iter().map(|t| t.team_id).collect();
        let mut seen = BTreeSet::new();

        for team_id in partition.values().flatten() {
            if !known.contains(team_id) {
                return Err(EngineError::InvalidPartition(format!(
                    "team {} is not registered",
                    team_id
                )));
            }
            if !seen.insert(*team_id) {
                return Err(EngineError::InvalidPartition(format!(
                    "team {} is assigned more than once",
                    team_id
                )));
            }
        }

        let missing: Vec<String> = known.difference(&seen).map(|id| id.to_string()).collect();
        if !missing.is_empty() {
            return Err(EngineError::InvalidPartition(format!(
                "teams without a group: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    fn initialize_standings(&mut self) {
        self.standings = self
            .teams
            .iter()
            .map(|team| (team.team_id, TeamStanding::for_team(team)))
            .collect();
    }
}
