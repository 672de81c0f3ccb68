//! High-level processing helpers that turn hit tables into cluster records.

use crate::{SeededClustering, SeededState};
use htcc_core::clustering::ClusteringStatistics;
use htcc_core::error::Result;
use htcc_core::geometry::ReconstructionParameters;
use htcc_core::hit::HitTable;
use htcc_core::record::ClusterRecord;

/// Cluster a single event and return its records.
///
/// # Errors
/// Returns an error if the event contains a hit with malformed detector
/// indices.
pub fn reconstruct_event(
    hits: &HitTable,
    params: &ReconstructionParameters,
) -> Result<Vec<ClusterRecord>> {
    EventReconstructor::new(params.clone()).process(hits)
}

/// Engine plus reusable state for processing events one after another.
#[derive(Debug)]
pub struct EventReconstructor {
    algo: SeededClustering,
    state: SeededState,
}

impl EventReconstructor {
    /// Create a reconstructor for the given parameters.
    #[must_use]
    pub fn new(params: ReconstructionParameters) -> Self {
        let algo = SeededClustering::new(params);
        let state = algo.create_state();
        Self { algo, state }
    }

    /// Cluster one event.
    ///
    /// # Errors
    /// Returns an error if the event contains a hit with malformed detector
    /// indices. Later events are unaffected.
    pub fn process(&mut self, hits: &HitTable) -> Result<Vec<ClusterRecord>> {
        let clusters = self.algo.cluster(hits, &mut self.state)?;
        Ok(clusters.iter().map(ClusterRecord::from_cluster).collect())
    }

    /// Statistics accumulated over every event processed so far.
    #[must_use]
    pub fn statistics(&self) -> ClusteringStatistics {
        self.algo.statistics(&self.state)
    }

    /// Parameters in use.
    #[must_use]
    pub fn params(&self) -> &ReconstructionParameters {
        self.algo.params()
    }
}

/// Iterator adapter that clusters each hit table of an event stream.
pub struct ReconstructStream<I> {
    events: I,
    reconstructor: EventReconstructor,
}

impl<I> ReconstructStream<I> {
    /// Statistics accumulated over the events yielded so far.
    #[must_use]
    pub fn statistics(&self) -> ClusteringStatistics {
        self.reconstructor.statistics()
    }
}

impl<I> Iterator for ReconstructStream<I>
where
    I: Iterator<Item = HitTable>,
{
    type Item = Result<Vec<ClusterRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let hits = self.events.next()?;
        Some(self.reconstructor.process(&hits))
    }
}

/// Lazily cluster a stream of events, one result per event.
pub fn reconstruct_stream<I>(events: I, params: &ReconstructionParameters) -> ReconstructStream<I::IntoIter>
where
    I: IntoIterator<Item = HitTable>,
{
    ReconstructStream {
        events: events.into_iter(),
        reconstructor: EventReconstructor::new(params.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use htcc_core::hit::RawHit;
    use htcc_core::Error;

    #[test]
    fn test_reconstruct_event_empty() {
        let records = reconstruct_event(&HitTable::default(), &ReconstructionParameters::default())
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_stream_continues_after_bad_event() {
        let good = HitTable::from(&[RawHit::new(2, 3, 1, 6, 14.0)][..]);
        let bad = HitTable::from(&[RawHit::new(9, 3, 1, 6, 14.0)][..]);

        let mut stream = reconstruct_stream(
            vec![good.clone(), bad, good],
            &ReconstructionParameters::default(),
        );
        assert_eq!(stream.next().unwrap().unwrap().len(), 1);
        assert_eq!(stream.next().unwrap(), Err(Error::InvalidThetaIndex(8)));
        assert_eq!(stream.next().unwrap().unwrap().len(), 1);
        assert!(stream.next().is_none());
        assert_eq!(stream.statistics().clusters_found, 2);
    }
}
