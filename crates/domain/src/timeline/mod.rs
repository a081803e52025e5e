//! Timeline dataset construction

mod builder;
mod dataset;

pub use builder::{TimelineBuilder, GROUP_PALETTE, NEUTRAL_COLOR, UNTITLED_EVENT};
pub use dataset::{
    DependencyEdge, ItemKind, LegendEntry, NarrativeGlyph, TimelineBackground, TimelineDataset,
    TimelineGroup, TimelineItem,
};
