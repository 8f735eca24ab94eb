use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use graphprep_core::{
    FeatureMatrix, FeatureProvider, Label, LabelMap, LabelProvider, ProviderError, StageObserver,
    StageOutcome, StageParam,
};
use rand::{Rng, rngs::SmallRng};

/// Feature provider returning one random value per vertex.
#[derive(Default)]
pub struct RandomFeatures {
    calls: AtomicUsize,
}

impl RandomFeatures {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeatureProvider for RandomFeatures {
    fn name(&self) -> &str {
        "random-features"
    }

    fn features(

        &self,

        vertices: usize,

        rng: &mut SmallRng,

    ) -> Result<FeatureMatrix, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FeatureMatrix::try_from_rows((0..vertices).map(|_| vec![rng.r#gen::<f32>()]).collect())
    }
}

/// Label provider labelling every vertex in order with a random bit.
pub struct AllVertices;

impl LabelProvider for AllVertices {
    fn name(&self) -> &str {
        "all-vertices"
    }

    fn labels(&self, vertices: usize, rng: &mut SmallRng) -> Result<LabelMap, ProviderError> {
        Ok((0..vertices)
            .map(|vertex| (vertex, Label::new(u32::from(rng.gen_bool(0.5)))))
            .collect())
    }
}

/// Label provider returning a fixed map regardless of the graph.
pub struct FixedLabels(pub LabelMap);

impl LabelProvider for FixedLabels {
    fn name(&self) -> &str {
        "fixed-labels"
    }

    fn labels(&self, _vertices: usize, _rng: &mut SmallRng) -> Result<LabelMap, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Feature provider returning a fixed number of rows regardless of the graph.
pub struct FixedRows(pub usize);

impl FeatureProvider for FixedRows {
    fn name(&self) -> &str {
        "fixed-rows"
    }

    fn features(

        &self,

        _vertices: usize,

        _rng: &mut SmallRng,

    ) -> Result<FeatureMatrix, ProviderError> {
        FeatureMatrix::filled(self.0, 1, 0.0)
    }
}

/// Feature provider that always fails.
pub struct BrokenFeatures;

impl FeatureProvider for BrokenFeatures {
    fn name(&self) -> &str {
        "broken-features"
    }

    fn features(

        &self,

        _vertices: usize,

        _rng: &mut SmallRng,

    ) -> Result<FeatureMatrix, ProviderError> {
        Err(ProviderError::ZeroDimension)
    }
}

/// Observer remembering `(stage, outcome)` for every closed scope.
#[derive(Default)]
pub struct OutcomeLog {
    ended: Mutex<Vec<(String, StageOutcome)>>,
}

impl OutcomeLog {
    pub fn ended(&self) -> Vec<(String, StageOutcome)> {
        self.ended.lock().expect("lock poisoned").clone()
    }
}

impl StageObserver for OutcomeLog {
    fn on_start(&self, _stage: &str, _params: &[StageParam]) {}

    fn on_update(&self, _stage: &str, _params: &[StageParam], _: Duration, _: Duration) {}

    fn on_end(&self, stage: &str, outcome: StageOutcome, _total: Duration) {
        self.ended
            .lock()
            .expect("lock poisoned")
            .push((stage.to_owned(), outcome));
    }
}
