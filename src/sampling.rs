//! Batch evaluation of an expression over many sample points
//!
//! With the `parallel` feature the points are evaluated with Rayon in fixed-size
//! chunks; outcomes are always returned in point order so callers can sum them
//! sequentially and get identical results with or without the feature.

use crate::evaluator::{EvaluationOutcome, eval_at};
use crate::{Deadline, Expr, IntegralError};

/// Points evaluated between two deadline checks
pub(crate) const CHUNK_SIZE: usize = 1024;

/// Evaluate `expr` at every point, in order
pub(crate) fn evaluate_points(
    expr: &Expr,
    variable: &str,
    points: &[f64],
    deadline: &Deadline,
) -> Result<Vec<EvaluationOutcome>, IntegralError> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let chunks: Vec<Vec<EvaluationOutcome>> = points
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                deadline.check()?;
                Ok(evaluate_chunk(expr, variable, chunk))
            })
            .collect::<Result<_, IntegralError>>()?;
        Ok(chunks.into_iter().flatten().collect())
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut outcomes = Vec::with_capacity(points.len());
        for chunk in points.chunks(CHUNK_SIZE) {
            deadline.check()?;
            outcomes.extend(evaluate_chunk(expr, variable, chunk));
        }
        Ok(outcomes)
    }
}

fn evaluate_chunk(expr: &Expr, variable: &str, chunk: &[f64]) -> Vec<EvaluationOutcome> {
    chunk
        .iter()
        .map(|&x| eval_at(expr, Some((variable, x))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::time::Duration;

    #[test]
    fn test_outcomes_follow_point_order() {
        let expr = parse("1/x", "x").unwrap();
        let points: Vec<f64> = (0..3000).map(|i| i as f64 - 1500.0).collect();
        let outcomes = evaluate_points(&expr, "x", &points, &Deadline::unlimited()).unwrap();
        assert_eq!(outcomes.len(), points.len());
        assert!(!outcomes[1500].is_value());
        assert_eq!(outcomes[1501], EvaluationOutcome::Value(1.0));
        assert_eq!(outcomes[0], EvaluationOutcome::Value(-1.0 / 1500.0));
    }

    #[test]
    fn test_expired_deadline() {
        let expr = parse("x", "x").unwrap();
        let deadline = Deadline::new(Some(Duration::ZERO));
        assert!(evaluate_points(&expr, "x", &[1.0, 2.0], &deadline).is_err());
    }
}
