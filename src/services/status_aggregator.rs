//! services/status_aggregator.rs
//! Deriva el estado de un post job a partir de su historial de eventos.

use std::collections::{BTreeSet, HashSet};

use crate::models::{
    channel_event_model::{Channel, ChannelEvent, Outcome, Stage},
    post_job_model::PostJobStatus,
};

/// Función pura de (canales seleccionados, eventos). Nunca devuelve `Queued`.
///
/// Los canales exitosos se toman de TODOS los eventos, sin filtrar por la
/// selección, y se comparan por cardinalidad: un `posted/success` de `system`
/// también cuenta. Se mantiene así hasta que producto defina otra cosa.
pub fn compute_status(selected: &BTreeSet<Channel>, events: &[ChannelEvent]) -> PostJobStatus {
    let has_error = events.iter().any(|e| e.outcome == Outcome::Error);

    let succeeded: HashSet<Channel> = events
        .iter()
        .filter(|e| e.stage == Stage::Posted && e.outcome == Outcome::Success)
        .map(|e| e.channel)
        .collect();

    if has_error {
        if succeeded.is_empty() {
            PostJobStatus::Error
        } else {
            PostJobStatus::Partial
        }
    } else if !selected.is_empty() && succeeded.len() == selected.len() {
        PostJobStatus::Success
    } else {
        // Sin selección nunca hay "success": 0 == 0 no significa publicado.
        PostJobStatus::Running
    }
}
