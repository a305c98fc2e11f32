mod fragment;
mod indicator_set;
mod market_state;
mod pattern;
mod price_bar;
mod signal;

pub use fragment::{
    FragmentId, FragmentTags, KnowledgeFragment, RankedFragment, RetrievalResult,
};
pub use indicator_set::{BollingerBands, IndicatorSet, MacdLine, StochasticOscillator};
pub use market_state::MarketState;
pub use pattern::{Pattern, PatternDirection, PatternKind};
pub use price_bar::PriceBar;
pub use signal::{Citation, RankedOpportunities, Signal, SignalAction};
