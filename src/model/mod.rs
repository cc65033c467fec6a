pub mod bar;
pub mod metrics;
pub mod series;

pub use bar::PriceBar;
pub use metrics::{ChangeMetrics, MetricName};
pub use series::{LookbackWindow, PriceSeries};
