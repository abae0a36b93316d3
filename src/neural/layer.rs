//! A single network layer: node values plus the weights to the next layer.

use crate::random::ProbabilitySource;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2};

/// Upper bound of freshly randomized weights
pub const RANDOMIZE_WEIGHT_NEW_MAX: f32 = 1.0;
/// Lower bound of freshly randomized weights
pub const RANDOMIZE_WEIGHT_NEW_MIN: f32 = -1.0;

/// One stage of a feed-forward network.
///
/// `weights[[i, j]]` is the influence of node `i` on node `j` of the next
/// layer. The output layer has `size_of_next_layer == 0` and an empty matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    weights: Array2<f32>,
    values: Array1<f32>,
}

impl Layer {
    /// Create a layer with zeroed values and randomized weights
    pub fn new<R: ProbabilitySource + ?Sized>(
        size_of_layer: usize,
        size_of_next_layer: usize,
        rng: &mut R,
    ) -> Self {
        let mut layer = Self {
            weights: Array2::zeros((size_of_layer, size_of_next_layer)),
            values: Array1::zeros(size_of_layer),
        };
        layer.randomize_weights(rng);
        layer
    }

    /// Number of nodes in this layer
    #[inline]
    pub fn size_of_layer(&self) -> usize {
        self.values.len()
    }

    /// Number of nodes this layer feeds into
    #[inline]
    pub fn size_of_next_layer(&self) -> usize {
        self.weights.ncols()
    }

    /// Write one node value. Panics if `position >= size_of_layer()`.
    #[inline]
    pub fn set_at(&mut self, position: usize, value: f32) {
        self.values[position] = value;
    }

    /// Read one node value. Panics if `position >= size_of_layer()`.
    #[inline]
    pub fn get_at(&self, position: usize) -> f32 {
        self.values[position]
    }

    pub fn values(&self) -> ArrayView1<'_, f32> {
        self.values.view()
    }

    /// Overwrite all node values. `values.len()` must equal `size_of_layer()`.
    pub fn set_values(&mut self, values: &[f32]) {
        assert_eq!(values.len(), self.size_of_layer(), "value count must match layer size");
        self.values
            .iter_mut()
            .zip(values)
            .for_each(|(dst, &src)| *dst = src);
    }

    pub(crate) fn values_mut(&mut self) -> &mut Array1<f32> {
        &mut self.values
    }

    pub fn weights(&self) -> ArrayView2<'_, f32> {
        self.weights.view()
    }

    pub fn weights_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.weights.view_mut()
    }

    /// Forward-propagate into `dest`: `dest[j] = sum_i values[i] * weights[[i, j]]`.
    ///
    /// No activation is applied. `dest.size_of_layer()` must equal
    /// `self.size_of_next_layer()`.
    #[inline]
    pub fn pump(&self, dest: &mut Layer) {
        debug_assert_eq!(dest.size_of_layer(), self.size_of_next_layer());
        dest.values.assign(&self.values.dot(&self.weights));
    }

    /// Draw every weight uniformly from `[RANDOMIZE_WEIGHT_NEW_MIN, RANDOMIZE_WEIGHT_NEW_MAX]`
    pub fn randomize_weights<R: ProbabilitySource + ?Sized>(&mut self, rng: &mut R) {
        self.weights
            .mapv_inplace(|_| rng.uniform(RANDOMIZE_WEIGHT_NEW_MIN, RANDOMIZE_WEIGHT_NEW_MAX));
    }

    /// Number of weights in the matrix
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    /// Check the layer holds no NaN/Inf
    pub fn is_valid(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite()) && self.values.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_construction_shapes_and_weight_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for (s1, s2) in [(1, 1), (2, 3), (7, 1), (16, 9)] {
            let layer = Layer::new(s1, s2, &mut rng);
            assert_eq!(layer.size_of_layer(), s1);
            assert_eq!(layer.size_of_next_layer(), s2);
            assert_eq!(layer.values().len(), s1);
            assert_eq!(layer.weights().dim(), (s1, s2));
            assert!(layer
                .weights()
                .iter()
                .all(|&w| (RANDOMIZE_WEIGHT_NEW_MIN..=RANDOMIZE_WEIGHT_NEW_MAX).contains(&w)));
        }
    }

    #[test]
    fn test_output_layer_has_no_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let layer = Layer::new(4, 0, &mut rng);
        assert_eq!(layer.weight_count(), 0);
        assert_eq!(layer.values().len(), 4);
    }

    #[test]
    fn test_set_and_get() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut layer = Layer::new(3, 2, &mut rng);
        layer.set_at(2, 1.5);
        assert_eq!(layer.get_at(2), 1.5);
        assert_eq!(layer.get_at(0), 0.0);
    }

    #[test]
    fn test_pump_sums_weighted_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut source = Layer::new(2, 1, &mut rng);
        let mut dest = Layer::new(1, 0, &mut rng);

        source.weights_mut().fill(1.0);
        source.set_values(&[3.0, 4.0]);
        source.pump(&mut dest);

        assert_eq!(dest.get_at(0), 7.0);
    }

    #[test]
    fn test_pump_is_linear() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut source = Layer::new(5, 3, &mut rng);
        let mut dest = Layer::new(3, 0, &mut rng);

        let inputs = [0.5, -1.0, 2.0, 0.25, -0.75];
        source.set_values(&inputs);
        source.pump(&mut dest);
        let base = dest.values().to_owned();

        let scaled: Vec<f32> = inputs.iter().map(|v| v * 3.0).collect();
        source.set_values(&scaled);
        source.pump(&mut dest);

        for (a, b) in dest.values().iter().zip(base.iter()) {
            assert_relative_eq!(*a, b * 3.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_pump_zero_inputs_give_zero_outputs() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let source = Layer::new(4, 6, &mut rng);
        let mut dest = Layer::new(6, 0, &mut rng);
        dest.set_values(&[9.0; 6]);

        source.pump(&mut dest);

        assert!(dest.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut original = Layer::new(3, 3, &mut rng);
        original.set_at(1, 2.0);

        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.weights_mut()[[0, 0]] = 100.0;
        copy.set_at(1, -2.0);
        assert_ne!(original.weights()[[0, 0]], 100.0);
        assert_eq!(original.get_at(1), 2.0);
    }
}
