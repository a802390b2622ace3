use crate::models::draws_containing;
use crate::scoring::ScoreContext;

/// prior = taux global, vraisemblance = part des sorties tombées dans la fenêtre récente,
/// évidence = poids de la fenêtre récente dans l'historique.
pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let size = ctx.shared.history_size();
    if size == 0 {
        return 0.0;
    }
    let appearances = ctx.shared.appearances(ctx.side, ctx.number);
    let prior = appearances as f64 / size as f64;

    let recent = ctx.shared.recent;
    let likelihood = if appearances > 0 {
        draws_containing(recent, ctx.side, ctx.number) as f64 / appearances as f64
    } else {
        0.0
    };

    let evidence = recent.len() as f64 / size as f64;
    if evidence > 0.0 {
        (likelihood * prior / evidence).clamp(0.0, 1.0)
    } else {
        prior
    }
}
