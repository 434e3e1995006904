//! Pure TrueSkill-style update for a single two-team game.
//!
//! Reimplements the factor-graph message passing directly rather than going
//! through a generic many-team ranking model, since every game here has
//! exactly two sides.

use crate::domain::{Outcome, Rating};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Tunables the kernel needs per call. Threaded through explicitly instead
/// of read from `crate::constants` so the kernel stays a pure function of
/// its arguments: a rebuild's recorded parameters must reproduce its own
/// output later even if the global defaults change.
#[derive(Debug, Clone, Copy)]
pub struct KernelParams {
    pub beta: f64,
    pub tau: f64,
    pub draw_probability: f64,
}

/// Runs the update for one game and returns the new (μ, σ) for every
/// participant, home side first, in the same order the roster was given.
///
/// Given identical inputs this always produces identical outputs: no
/// randomness, no shared mutable state, no I/O.
pub fn update_game(
    home: &[Rating],
    away: &[Rating],
    outcome: Outcome,
    weight: f64,
    params: KernelParams,
) -> (Vec<Rating>, Vec<Rating>) {
    let total_players = (home.len() + away.len()) as f64;
    let variance_sum: f64 = home
        .iter()
        .chain(away.iter())
        .map(|r| r.sigma * r.sigma)
        .sum();
    let c = (total_players * params.beta * params.beta + variance_sum).sqrt();

    let normal = Normal::new(0.0, 1.0).expect("standard normal is always valid");
    let draw_margin = normal.inverse_cdf((params.draw_probability + 1.0) / 2.0) * total_players.sqrt() * params.beta;

    let home_mu_sum: f64 = home.iter().map(|r| r.mu).sum();
    let away_mu_sum: f64 = away.iter().map(|r| r.mu).sum();
    let delta_mu = home_mu_sum - away_mu_sum;

    let (home_sign, v, w) = match outcome {
        Outcome::HomeWin => {
            let (v, w) = v_w_win(delta_mu / c, draw_margin / c, &normal);
            (1.0, v, w)
        }
        Outcome::AwayWin => {
            let (v, w) = v_w_win(-delta_mu / c, draw_margin / c, &normal);
            (-1.0, v, w)
        }
        Outcome::Draw => {
            let (v, w) = v_w_draw(delta_mu / c, draw_margin / c, &normal);
            (1.0, v, w)
        }
    };

    let home_out = apply_update(home, home_sign, v, w, c, weight, params.tau);
    let away_out = apply_update(away, -home_sign, v, w, c, weight, params.tau);
    (home_out, away_out)
}

fn apply_update(
    members: &[Rating],
    sign: f64,
    v: f64,
    w: f64,
    c: f64,
    weight: f64,
    tau: f64,
) -> Vec<Rating> {
    members
        .iter()
        .map(|r| {
            let dynamic_variance = r.sigma * r.sigma + tau * tau;
            let mu_delta = weight * sign * (dynamic_variance / c) * v;
            let shrinkage = (dynamic_variance / (c * c)) * w;
            let retained = (1.0 - weight * shrinkage).max(1e-12);
            Rating {
                mu: r.mu + mu_delta,
                sigma: (dynamic_variance * retained).sqrt(),
            }
        })
        .collect()
}

fn v_w_win(t: f64, margin: f64, normal: &Normal) -> (f64, f64) {
    let x = t - margin;
    let denom = normal.cdf(x);
    let v = if denom > 1e-12 {
        normal.pdf(x) / denom
    } else {
        -x
    };
    (v, v * (v + x))
}

fn v_w_draw(t: f64, margin: f64, normal: &Normal) -> (f64, f64) {
    let abs_t = t.abs();
    let a = margin - abs_t;
    let b = -margin - abs_t;
    let denom = normal.cdf(a) - normal.cdf(b);
    if denom < 1e-12 {
        return (0.0, 1.0);
    }
    let unsigned_v = (normal.pdf(b) - normal.pdf(a)) / denom;
    let v = if t < 0.0 { -unsigned_v } else { unsigned_v };
    let w = unsigned_v * unsigned_v + (a * normal.pdf(a) - b * normal.pdf(b)) / denom;
    (v, w)
}
