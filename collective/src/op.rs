//! Aggregations applied across a reduce round's contributions.

use vecmath::VectorError;

/// How a reduce round combines its contributions.
///
/// Both operations are associative and commutative, so the combined result
/// does not depend on the order contributions arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Elementwise sum.
    Sum,
    /// Elementwise sum divided by the contribution count.
    Average,
}

impl ReduceOp {
    /// Combines vector contributions elementwise.
    ///
    /// # Errors
    /// `LengthMismatch` on ragged contributions, `EmptyInput` on none.
    pub fn combine(&self, contributions: &[Vec<f32>]) -> Result<Vec<f32>, VectorError> {
        let views = contributions.iter().map(Vec::as_slice);
        match self {
            ReduceOp::Sum => vecmath::sum(views),
            ReduceOp::Average => vecmath::average(views),
        }
    }

    /// Scalar counterpart of [`combine`](Self::combine).
    pub fn combine_scalars(&self, contributions: &[f32]) -> Result<f32, VectorError> {
        if contributions.is_empty() {
            return Err(VectorError::EmptyInput);
        }

        let total: f32 = contributions.iter().sum();
        match self {
            ReduceOp::Sum => Ok(total),
            ReduceOp::Average => Ok(total / contributions.len() as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_matches_the_operation() {
        let contributions = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(
            ReduceOp::Sum.combine(&contributions).unwrap(),
            vec![4.0, 6.0]
        );
        assert_eq!(
            ReduceOp::Average.combine(&contributions).unwrap(),
            vec![2.0, 3.0]
        );
    }

    #[test]
    fn combine_is_order_independent() {
        let forward = vec![vec![1.0, -2.0], vec![0.5, 8.0], vec![-3.0, 0.25]];
        let mut reversed = forward.clone();
        reversed.reverse();

        for op in [ReduceOp::Sum, ReduceOp::Average] {
            assert_eq!(op.combine(&forward).unwrap(), op.combine(&reversed).unwrap());
        }
    }

    #[test]
    fn scalars_combine() {
        assert_eq!(ReduceOp::Sum.combine_scalars(&[0.5, 1.5]).unwrap(), 2.0);
        assert_eq!(ReduceOp::Average.combine_scalars(&[1.0, 3.0]).unwrap(), 2.0);
        assert_eq!(
            ReduceOp::Sum.combine_scalars(&[]).unwrap_err(),
            VectorError::EmptyInput
        );
    }
}
