use redapp_bridge::calls::{
    internet_detected, CalendarField, ForecastCalculator, ForecastTime, Interpolator, Model,
    Province, PurgeMode, UtcCalendar, WeatherRow, WeatherStream,
};
use redapp_bridge::{BridgeConfig, JvmBridge, Tristate};

#[test]
fn province_field_names_match_the_managed_enum() {
    assert_eq!(Province::Alberta.java_field(), "ALBERTA");
    assert_eq!(Province::BritishColumbia.java_field(), "BRITISH_COLUMBIA");
    assert_eq!(
        Province::NewfoundlandAndLabrador.java_field(),
        "NEWFOUNDLAND_AND_LABRADOR"
    );
    assert_eq!(
        Province::NorthwestTerritories.java_field(),
        "NORTHWEST_TERRITORIES"
    );
    assert_eq!(
        Province::PrinceEdwardIsland.java_field(),
        "PRINCE_EDWARD_ISLAND"
    );
    assert_eq!(Province::Yukon.java_field(), "YUKON");
    assert_eq!(Province::ALL.len(), 13);
}

#[test]
fn model_and_time_map_to_their_managed_constants() {
    assert_eq!(Model::GemDeterministic.java_field(), "GEM_DETER");
    assert_eq!(Model::Ncep.java_field(), "NCEP");
    assert_eq!(Model::Gem.java_field(), "GEM");
    assert_eq!(Model::Both.java_field(), "BOTH");
    assert_eq!(Model::Custom.java_field(), "CUSTOM");
    assert_eq!(ForecastTime::Midnight.java_field(), "MIDNIGHT");
    assert_eq!(ForecastTime::Noon.java_field(), "NOON");
}

#[test]
fn calendar_field_indices_match_java_util_calendar() {
    assert_eq!(CalendarField::Year as i32, 1);
    assert_eq!(CalendarField::Month as i32, 2);
    assert_eq!(CalendarField::DayOfMonth as i32, 5);
    assert_eq!(CalendarField::HourOfDay as i32, 11);
    assert_eq!(CalendarField::Minute as i32, 12);
    assert_eq!(CalendarField::Second as i32, 13);
}

#[test]
fn purge_modes_have_their_wire_values() {
    assert_eq!(PurgeMode::Failure as i32, 0);
    assert_eq!(PurgeMode::Allow as i32, 1);
    assert_eq!(PurgeMode::Fix as i32, 2);
}

#[test]
fn streamable_layout_is_semicolon_terminated() {
    let mut calc = ForecastCalculator::new("Edmonton");
    calc.model = Model::Ncep;
    calc.time = ForecastTime::Noon;
    calc.timezone = -6;
    calc.date_text = "20260829120000 UTC".to_string();

    assert_eq!(
        calc.to_streamable(),
        "ACHERON;1;1;Edmonton;-6;20260829120000 UTC;1;"
    );
}

#[test]
fn streamable_appends_custom_members() {
    let mut calc = ForecastCalculator::new("Banff");
    calc.model = Model::Custom;
    calc.members = vec![1, 5, 9];

    let text = calc.to_streamable();
    assert!(text.starts_with("ACHERON;1;4;Banff;0;;0;"));
    assert!(text.ends_with("1;5;9;"));
}

#[test]
fn streamable_recognition_is_prefix_based() {
    assert!(ForecastCalculator::is_streamable("ACHERON;1;0;X;0;;0;"));
    assert!(ForecastCalculator::is_streamable("ACHERON"));
    assert!(!ForecastCalculator::is_streamable("Edmonton"));
    assert!(!ForecastCalculator::is_streamable(" ACHERON"));
    assert!(!ForecastCalculator::is_streamable(""));
}

#[test]
fn weather_row_defaults_mark_absent_columns() {
    let row = WeatherRow::default();
    assert_eq!(row.wind_gust, -1.0);
    assert_eq!(row.ffmc, -1.0);
    assert_eq!(row.dmc, -1.0);
    assert_eq!(row.dc, -1.0);
    assert_eq!(row.bui, -1.0);
    assert_eq!(row.isi, -1.0);
    assert_eq!(row.fwi, -1.0);
    assert_eq!(row.temperature, 0.0);
    assert_eq!(row.precipitation, 0.0);
    assert_eq!(row.epoch_seconds, 0);
    assert_eq!(row.options, 0);
}

#[test]
fn connectivity_is_invalid_without_a_runtime() {
    let bridge = JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java"));
    assert_eq!(internet_detected(&bridge), Tristate::Invalid);
}

#[test]
fn city_queries_degrade_to_empty_without_a_runtime() {
    let bridge = JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java"));
    assert!(redapp_bridge::calls::get_cities(&bridge, Province::Alberta).is_empty());
    assert!(redapp_bridge::calls::get_forecast_cities(&bridge, Province::Ontario).is_empty());
    assert_eq!(bridge.jobs_executed(), 0);
}

#[test]
fn forecast_calculation_degrades_without_a_runtime() {
    let bridge = JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java"));
    let mut calc = ForecastCalculator::new("Edmonton");
    calc.date_text = "20260829120000 UTC".to_string();
    assert!(calc.calculate(&bridge).is_none());
    assert_eq!(bridge.jobs_executed(), 0);
}

#[test]
fn forecast_calculation_requires_a_location() {
    let bridge = JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java"));
    let calc = ForecastCalculator::new("");
    assert!(calc.calculate(&bridge).is_none());
}

#[test]
fn managed_wrappers_degrade_without_a_runtime() {
    let bridge = JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java"));
    assert!(UtcCalendar::new(&bridge).is_none());
    assert!(WeatherStream::new(&bridge).is_none());
    assert!(Interpolator::new(&bridge).is_none());
    assert_eq!(bridge.jobs_executed(), 0);
}
