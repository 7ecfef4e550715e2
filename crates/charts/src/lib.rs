//! Charts - Dashboard chart specification compiler
//!
//! This crate turns a chart configuration plus raw records into a
//! declarative, echarts-style chart specification:
//! - Widget parameter cascade (component, kind, configured, call site)
//! - Chart data contexts with validation and optional memoization
//! - Per-kind specification builders dispatched from one table
//! - Palettes, gradients and advanced option pass-through
//!
//! # Example
//!
//! ```rust
//! use chart_data::{parse_records, Aggregation, BucketSpec, BucketType, Metric};
//! use charts::{build_chart_specification, create_data_context, ChartConfig, ChartKind};
//!
//! let records = parse_records(r#"[{"month": "Jan", "sales": 100}, {"month": "Feb", "sales": 200}]"#).unwrap();
//! let config = ChartConfig::new(
//!     vec![Metric::new("sales", Aggregation::Sum)],
//!     vec![BucketSpec::new(BucketType::Terms, "month")],
//! );
//!
//! let context = create_data_context(ChartKind::Bar, &records, &config, None);
//! let spec = build_chart_specification(&context);
//! assert_eq!(spec.series[0].name, "Sum of sales");
//! ```

mod config;
mod error;
mod params;
mod service;
mod spec;
mod styles;
pub mod builder;

pub use builder::{
    build, build_chart_specification, build_panel_specifications, build_series, builder_for, specification_json,
    AxisOptions, BuilderFns, PanelView,
};
pub use config::{ChartConfig, ChartKind};
pub use error::{ChartError, ChartResult};
pub use params::{deep_merge, merge_widget_params, resolve_widget_params, WidgetParams};
pub use service::{
    create_data_context, create_data_context_with_defaults, process_chart_data, validate_bucket_chart_config,
    validate_chart_config, validate_dataset_config, ChartDataContext, ChartDataService,
};
pub use spec::*;
pub use styles::{
    color_for_index, gradient_fill, palette_color, Color, ColorScheme, ColorStop, Fill, Gradient, GradientKind,
    DEFAULT_PALETTE,
};
