use caipiao_db::models::parse_number;

use crate::analysis::is_prime;
use crate::scoring::ScoreContext;

/// Les contraintes de grille (somme, écart, AC, parité, zones) agissent à l'optimisation ;
/// par numéro elles restent neutres.
pub fn neutral(_ctx: &ScoreContext<'_>) -> f64 {
    0.5
}

pub fn prime_composite(ctx: &ScoreContext<'_>) -> f64 {
    match parse_number(ctx.number) {
        Ok(n) if is_prime(n as u32) => 0.6,
        _ => 0.4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::markov::MarkovMemo;
    use crate::scoring::SharedData;
    use caipiao_db::models::Side;

    #[test]
    fn test_constants() {
        let shared = SharedData::new(&[], 10);
        let memo = MarkovMemo::default();
        let ctx = |number| ScoreContext { number, side: Side::Primary, shared: &shared, markov: &memo };
        assert_eq!(neutral(&ctx("04")), 0.5);
        assert_eq!(prime_composite(&ctx("07")), 0.6);
        assert_eq!(prime_composite(&ctx("02")), 0.6);
        assert_eq!(prime_composite(&ctx("09")), 0.4);
        assert_eq!(prime_composite(&ctx("01")), 0.4);
        assert_eq!(prime_composite(&ctx("00")), 0.4);
    }
}
