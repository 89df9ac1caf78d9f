use crate::error::{QuizError, QuizResult};
use crate::models::{PlayerAnswers, PlayerScore, QuestionStats, SessionResults};
use crate::services::session_machine::SessionState;

/// Final statistics for an ended session.
///
/// Ranking is descending score, then ascending total response time, then
/// join order. `leaderboard_size` truncates the ranked list only after the
/// full ordering has been applied.
pub fn aggregate(state: &SessionState, leaderboard_size: Option<usize>) -> QuizResult<SessionResults> {
    if state.is_active() {
        return Err(QuizError::SessionNotEnded);
    }

    let questions = state.questions();
    let total = questions.len();

    let roster = state.players();
    let mut scores: Vec<PlayerScore> = roster
        .iter()
        .map(|player| {
            let mut score = 0u64;
            let mut correct_count = 0usize;
            let mut response_times_ms = vec![None; total];

            for record in state.ledger().for_player(&player.id) {
                let Some(started_at) = state.started_at(record.question_index) else {
                    continue;
                };
                response_times_ms[record.question_index] =
                    Some((record.submitted_at - started_at).num_milliseconds());
                if record.correct {
                    correct_count += 1;
                    score += u64::from(questions[record.question_index].points);
                }
            }

            PlayerScore {
                rank: 0,
                player_id: player.id.clone(),
                name: player.name.clone(),
                score,
                correct_count,
                accuracy: if total == 0 {
                    0.0
                } else {
                    correct_count as f64 / total as f64
                },
                total_response_time_ms: response_times_ms.iter().flatten().sum(),
                response_times_ms,
            }
        })
        .collect();

    // the roster is in join order and sort_by is stable, so ties keep it.
    scores.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.total_response_time_ms.cmp(&b.total_response_time_ms))
    });
    for (i, entry) in scores.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    if let Some(limit) = leaderboard_size {
        scores.truncate(limit);
    }

    let question_stats = (0..total)
        .map(|index| {
            let mut answer_count = 0usize;
            let mut correct_count = 0usize;
            let mut response_total = 0i64;
            for (_, record) in state.ledger().for_question(index) {
                answer_count += 1;
                if record.correct {
                    correct_count += 1;
                }
                if let Some(started_at) = state.started_at(index) {
                    response_total += (record.submitted_at - started_at).num_milliseconds();
                }
            }
            let players = roster.len();
            QuestionStats {
                question_index: index,
                answer_count,
                correct_count,
                correct_rate: if players == 0 {
                    0.0
                } else {
                    correct_count as f64 / players as f64
                },
                average_response_time_ms: (answer_count > 0)
                    .then(|| response_total as f64 / answer_count as f64),
            }
        })
        .collect();

    let players = roster
        .iter()
        .map(|player| PlayerAnswers {
            player_id: player.id.clone(),
            name: player.name.clone(),
            answers: state
                .ledger()
                .for_player(&player.id)
                .iter()
                .filter_map(|record| state.outcome(record))
                .collect(),
        })
        .collect();

    Ok(SessionResults {
        session_id: state.id().to_string(),
        question_count: total,
        leaderboard: scores,
        questions: question_stats,
        players,
    })
}
