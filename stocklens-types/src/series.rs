//! Daily OHLCV points and the validated series the chart consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// One trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Trading day.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Closing price; the chart's price line.
    pub close: f64,
    /// Shares traded.
    pub volume: u64,
}

/// Ordered history, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistorySeries {
    points: Vec<HistoryPoint>,
}

impl HistorySeries {
    /// Wrap points that are already strictly increasing by date.
    ///
    /// # Errors
    /// `UnorderedSeries` pointing at the first point that does not advance the date.
    pub fn new(points: Vec<HistoryPoint>) -> Result<Self, ValidationError> {
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].date <= w[0].date)
            .map(|i| i + 1)
        {
            return Err(ValidationError::UnorderedSeries {
                index,
                date: points[index].date,
            });
        }
        Ok(Self { points })
    }

    /// Sort by date and keep the last point seen for each duplicated date.
    #[must_use]
    pub fn from_unsorted(mut points: Vec<HistoryPoint>) -> Self {
        // Stable sort keeps arrival order among equal dates.
        points.sort_by_key(|p| p.date);
        let mut out: Vec<HistoryPoint> = Vec::with_capacity(points.len());
        for p in points {
            match out.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => out.push(p),
            }
        }
        Self { points: out }
    }

    /// Points in date order.
    #[must_use]
    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    /// Consume into the underlying points.
    #[must_use]
    pub fn into_points(self) -> Vec<HistoryPoint> {
        self.points
    }
}

impl<'de> Deserialize<'de> for HistorySeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            points: Vec<HistoryPoint>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.points).map_err(serde::de::Error::custom)
    }
}

/// Latest real quote for a symbol, used to seed placeholder history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcSnapshot {
    /// Day the quote belongs to.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Current close.
    pub close: f64,
    /// Current volume, when the feed reports one.
    pub volume: Option<u64>,
}
