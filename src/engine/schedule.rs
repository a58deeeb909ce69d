use chrono::{Duration, NaiveDateTime};
use log::{info, warn};

use super::TournamentEngine;
use crate::config::MAX_MATCH_DURATION_MINUTES;
use crate::domain::{Match, MatchId, Stage};

/// Which matches a scheduling call touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSelection {
    All,
    Stage(Stage),
    Ids(Vec<MatchId>),
}

impl MatchSelection {
    fn includes(&self, m: &Match) -> bool {
        match self {
            MatchSelection::All => true,
            MatchSelection::Stage(stage) => m.stage == *stage,
            MatchSelection::Ids(ids) => ids.contains(&m.match_id),
        }
    }
}

/// Give consecutive batches of `parallel_matches` the same start time. Each
/// batch starts one match duration after the previous one.
///
/// Stops at the first slot that falls outside the calendar; the remaining
/// matches keep their previous times. Returns how many matches were timed.
pub fn assign_time_slots<'a>(
    matches: impl IntoIterator<Item = &'a mut Match>,
    start_time: NaiveDateTime,
    match_duration: Duration,
    parallel_matches: usize,
) -> usize {
    let parallel_matches = parallel_matches.max(1);
    let mut scheduled = 0;

    for (position, m) in matches.into_iter().enumerate() {
        let Some((slot_start, slot_end)) = slot_bounds(start_time, match_duration, position / parallel_matches)
        else {
            warn!("Match {} cannot be scheduled past {}", m.match_id, start_time);
            break;
        };
        m.scheduled_time = Some(slot_start);
        m.end_time = Some(slot_end);
        scheduled += 1;
    }

    scheduled
}

fn slot_bounds(
    start_time: NaiveDateTime,
    match_duration: Duration,
    slot: usize,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let offset = match_duration.checked_mul(i32::try_from(slot).ok()?)?;
    let slot_start = start_time.checked_add_signed(offset)?;
    let slot_end = slot_start.checked_add_signed(match_duration)?;
    Some((slot_start, slot_end))
}

impl TournamentEngine {
    /// Assign start and end times to the selected matches in list order.
    /// Matches outside the selection keep their times.
    pub fn schedule_matches(
        &mut self,
        start_time: NaiveDateTime,
        selection: &MatchSelection,
        parallel_matches: usize,
    ) -> Vec<Match> {
        let duration = Duration::try_minutes(self.settings.match_duration_minutes)
            .unwrap_or_else(|| Duration::minutes(MAX_MATCH_DURATION_MINUTES));

        let scheduled = assign_time_slots(
            self.matches.iter_mut().filter(|m| selection.includes(m)),
            start_time,
            duration,
            parallel_matches,
        );
        info!(
            "Scheduled {} matches from {} ({} in parallel)",
            scheduled, start_time, parallel_matches
        );

        self.matches
            .iter()
            .filter(|m| selection.includes(m))
            .cloned()
            .collect()
    }

    /// Latest end time among the matches of `stage`.
    pub fn stage_end_time(&self, stage: Stage) -> Option<NaiveDateTime> {
        self.matches
            .iter()
            .filter(|m| m.stage == stage)
            .filter_map(|m| m.end_time)
            .max()
    }
}
