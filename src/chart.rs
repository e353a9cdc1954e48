use crate::api::SamplePoint;

/// One x position of the actual-vs-predicted chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: i64,
    pub actual: f64,
    pub predicted: f64,
}

impl From<&SamplePoint> for ChartPoint {
    fn from(sample: &SamplePoint) -> Self {
        Self {
            x: sample.index,
            actual: sample.actual,
            predicted: sample.predicted,
        }
    }
}

/// Render-ready comparison series.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChartData {
    /// The backend answered, but with no samples.
    #[default]
    NoData,
    Series(Vec<ChartPoint>),
}

impl ChartData {
    /// Returns the points in render order; empty for `NoData`.
    pub fn points(&self) -> &[ChartPoint] {
        match self {
            ChartData::NoData => &[],
            ChartData::Series(points) => points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    /// Returns the `(min, max)` over both lines, for scaling the y axis.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.points()
            .iter()
            .flat_map(|p| [p.actual, p.predicted])
            .fold(None, |bounds, y| match bounds {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }
}

/// Turns backend samples into a chart series.
///
/// Samples are kept in the order received; the x axis follows that order.
pub fn adapt(samples: &[SamplePoint]) -> ChartData {
    if samples.is_empty() {
        return ChartData::NoData;
    }
    ChartData::Series(samples.iter().map(ChartPoint::from).collect())
}
