//! Name -> implementation dispatch table. Carry state itself lives on the
//! store's `IndicatorData` records, not here — the registry only resolves
//! `"sma"` to an [`Indicator`] instance; [`crate::store`] is what remembers
//! each symbol's last result between calls.

use std::collections::BTreeMap;

use session_data::Bar;

use super::{
    momentum::{Cci, Macd, Mom, Roc, Rsi, Stochastic, UltimateOscillator, WilliamsR},
    support_resistance::{AtrDaily, AvgRange, AvgVolume, GapStats, HighLowN, PivotPoints, RangeRatio, SwingPoints},
    trend::{Dema, Ema, Hma, Sma, Tema, Twap, Vwap, Wma},
    volatility::{Atr, Bollinger, Donchian, HistoricalVol, Keltner, StdDev},
    volume::{Obv, Pvt, VolumeRatio, VolumeSma},
    Indicator, IndicatorConfig, IndicatorResult,
};

pub struct IndicatorRegistry {
    indicators: BTreeMap<&'static str, Box<dyn Indicator>>,
}

impl IndicatorRegistry {
    pub fn with_defaults() -> Self {
        let all: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma),
            Box::new(Ema),
            Box::new(Wma),
            Box::new(Dema),
            Box::new(Tema),
            Box::new(Hma),
            Box::new(Vwap),
            Box::new(Twap),
            Box::new(Rsi),
            Box::new(Macd),
            Box::new(Stochastic),
            Box::new(Cci),
            Box::new(Roc),
            Box::new(Mom),
            Box::new(WilliamsR),
            Box::new(UltimateOscillator),
            Box::new(Atr),
            Box::new(Bollinger),
            Box::new(Keltner),
            Box::new(Donchian),
            Box::new(StdDev),
            Box::new(HistoricalVol),
            Box::new(Obv),
            Box::new(Pvt),
            Box::new(VolumeSma),
            Box::new(VolumeRatio),
            Box::new(PivotPoints),
            Box::new(HighLowN),
            Box::new(SwingPoints),
            Box::new(AvgVolume),
            Box::new(AvgRange),
            Box::new(AtrDaily),
            Box::new(GapStats),
            Box::new(RangeRatio),
        ];
        let indicators = all.into_iter().map(|ind| (ind.name(), ind)).collect();
        Self { indicators }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Indicator> {
        self.indicators.get(name).map(|b| b.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indicators.keys().copied()
    }

    pub fn calculate(
        &self,
        name: &str,
        bars: &[Bar],
        config: &IndicatorConfig,
        symbol: &str,
        previous: Option<&IndicatorResult>,
    ) -> Option<IndicatorResult> {
        self.get(name).map(|ind| ind.calculate(bars, config, symbol, previous))
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
