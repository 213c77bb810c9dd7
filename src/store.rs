use std::cmp::Ordering;

use rand_core::RngCore;

use crate::config::LayeringMode;
use crate::layer::SedimentLayer;

/// Bounded, time-ordered collection of sediment layers (oldest first).
///
/// Invariant: `len() <= max_layers` after any mutation completes. Enforced by
/// evicting index 0 right after insertion and again after the aging pass.
#[derive(Clone, Debug)]
pub struct LayerStore {
    layers: Vec<SedimentLayer>,
    max_layers: usize,
}

impl LayerStore {
    pub fn new(max_layers: usize) -> Self {
        Self {
            layers: Vec::new(),
            max_layers: max_layers.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn max_layers(&self) -> usize {
        self.max_layers
    }

    /// Shrinking the bound evicts oldest layers immediately.
    pub fn set_max_layers(&mut self, max_layers: usize) {
        self.max_layers = max_layers.max(1);
        self.enforce_capacity();
    }

    pub fn layers(&self) -> &[SedimentLayer] {
        &self.layers
    }

    pub fn newest(&self) -> Option<&SedimentLayer> {
        self.layers.last()
    }

    pub fn oldest_age(&self) -> u64 {
        self.layers.first().map(|l| l.age).unwrap_or(0)
    }

    pub fn average_motion(&self) -> f64 {
        if self.layers.is_empty() {
            return 0.0;
        }
        let total: f64 = self.layers.iter().map(|l| l.motion_intensity).sum();
        total / self.layers.len() as f64
    }

    pub fn append(&mut self, layer: SedimentLayer) {
        self.layers.push(layer);
        self.enforce_capacity();
    }

    /// Ages every layer one tick: compaction decay (when `compaction_rate` is
    /// positive), neighbor-driven erosion for interior layers, organic drift.
    /// Re-enforces the capacity bound afterwards.
    pub fn tick(&mut self, compaction_rate: f64) {
        let intensities: Vec<f64> = self.layers.iter().map(|l| l.motion_intensity).collect();

        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.tick(compaction_rate);
            if i > 0 && i + 1 < intensities.len() {
                let neighboring = (intensities[i - 1] + intensities[i + 1]) / 2.0;
                layer.erode_toward(neighboring);
            }
        }

        self.enforce_capacity();
    }

    /// An ordering of the current layers for the given mode, as indices into
    /// [`Self::layers`]. Non-standard modes operate on a copy; stored order is
    /// never touched. `random` shuffles through the injected source so tests
    /// can assert structural properties.
    pub fn order_indices(&self, mode: LayeringMode, rng: &mut dyn RngCore) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.layers.len()).collect();
        match mode {
            LayeringMode::Reverse => order.reverse(),
            LayeringMode::Random => shuffle(&mut order, rng),
            LayeringMode::Intensity => order.sort_by(|&a, &b| {
                self.layers[a]
                    .motion_intensity
                    .partial_cmp(&self.layers[b].motion_intensity)
                    .unwrap_or(Ordering::Equal)
            }),
            _ => {}
        }
        order
    }

    fn enforce_capacity(&mut self) {
        while self.layers.len() > self.max_layers {
            self.layers.remove(0);
            tracing::debug!(max_layers = self.max_layers, "evicted oldest layer");
        }
    }
}

fn shuffle(indices: &mut [usize], rng: &mut dyn RngCore) {
    for i in (1..indices.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        indices.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlendMode, LayeringMode};
    use crate::core::{PixelBuffer, Rgba};
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    fn layer(intensity: f64, position: f64) -> SedimentLayer {
        SedimentLayer {
            pixels: PixelBuffer::blank(2, 8),
            position,
            captured_at_ms: 0,
            age: 0,
            motion_intensity: intensity,
            wave_displacement: 0.0,
            organic_variation: 0.0,
            erosion_factor: 0.0,
            compaction: 1.0,
            color: Rgba::opaque(0.0, 0.0, 0.0),
            layering_mode: LayeringMode::Standard,
            blend_mode: BlendMode::Normal,
            opacity: 0.8,
            spacing: 0.0,
            offset: 0.0,
            distortion: 0.0,
            blur: 0.0,
            stratigraphy_type: 0,
            brick_row: 0,
            brick_size: 10,
        }
    }

    #[test]
    fn capacity_bound_holds_across_appends() {
        let mut store = LayerStore::new(5);
        for i in 0..8 {
            store.append(layer(0.0, f64::from(i) * 10.0));
            assert!(store.len() <= 5);
        }
        // The retained layers are exactly the last five inserted.
        let positions: Vec<f64> = store.layers().iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![30.0, 40.0, 50.0, 60.0, 70.0]);
    }

    #[test]
    fn shrinking_capacity_evicts_oldest() {
        let mut store = LayerStore::new(10);
        for i in 0..6 {
            store.append(layer(0.0, f64::from(i)));
        }
        store.set_max_layers(3);
        let positions: Vec<f64> = store.layers().iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn erosion_is_monotonic_across_ticks() {
        let mut store = LayerStore::new(10);
        for i in 0..5 {
            store.append(layer(f64::from(i) * 60.0, 0.0));
        }
        let mut previous = vec![0.0f64; store.len()];
        for _ in 0..20 {
            store.tick(0.0);
            for (layer, prev) in store.layers().iter().zip(&previous) {
                assert!(layer.erosion_factor >= *prev);
            }
            previous = store.layers().iter().map(|l| l.erosion_factor).collect();
        }
    }

    #[test]
    fn interior_layers_erode_from_neighbors() {
        let mut store = LayerStore::new(10);
        store.append(layer(255.0, 0.0));
        store.append(layer(0.0, 0.0));
        store.append(layer(255.0, 0.0));
        store.tick(0.0);
        // Middle layer floor: avg(255, 255)/255 * 0.05.
        assert!((store.layers()[1].erosion_factor - 0.05).abs() < 1e-12);
        // Edge layers have no neighbor pair and stay put.
        assert_eq!(store.layers()[0].erosion_factor, 0.0);
        assert_eq!(store.layers()[2].erosion_factor, 0.0);
    }

    #[test]
    fn compaction_floor_holds_for_any_rate() {
        let mut store = LayerStore::new(4);
        store.append(layer(0.0, 0.0));
        for _ in 0..1000 {
            store.tick(0.9);
        }
        assert_eq!(store.layers()[0].compaction, 0.1);
    }

    #[test]
    fn ordering_modes_do_not_mutate_store_order() {
        let mut store = LayerStore::new(10);
        for i in 0..6 {
            store.append(layer(f64::from(5 - i) * 40.0, f64::from(i)));
        }
        let before: Vec<f64> = store.layers().iter().map(|l| l.position).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for mode in LayeringMode::ALL {
            let _ = store.order_indices(mode, &mut rng);
        }
        let after: Vec<f64> = store.layers().iter().map(|l| l.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn intensity_order_is_ascending() {
        let mut store = LayerStore::new(20);
        for i in [3, 0, 4, 1, 2] {
            store.append(layer(f64::from(i) * 25.0, 0.0));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let order = store.order_indices(LayeringMode::Intensity, &mut rng);
        let intensities: Vec<f64> = order
            .iter()
            .map(|&i| store.layers()[i].motion_intensity)
            .collect();
        assert_eq!(intensities, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn random_order_is_a_permutation() {
        let mut store = LayerStore::new(20);
        for i in 0..12 {
            store.append(layer(f64::from(i), 0.0));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let order = store.order_indices(LayeringMode::Random, &mut rng);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn reverse_order_flips_insertion_order() {
        let mut store = LayerStore::new(10);
        for i in 0..4 {
            store.append(layer(0.0, f64::from(i)));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let order = store.order_indices(LayeringMode::Reverse, &mut rng);
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn empty_store_queries_return_neutral_results() {
        let store = LayerStore::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(store.is_empty());
        assert_eq!(store.oldest_age(), 0);
        assert_eq!(store.average_motion(), 0.0);
        assert!(store.newest().is_none());
        assert!(
            store
                .order_indices(LayeringMode::Random, &mut rng)
                .is_empty()
        );
    }
}
