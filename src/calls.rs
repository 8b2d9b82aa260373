//! Domain call surface: weather, forecast, calendar, and interpolation
//! operations expressed purely as bridge calls.
//!
//! Everything here is a thin shape over the facade's generic operation
//! set; the class/method/field names and JNI signatures form the
//! implicit contract with the managed REDapp library. A renamed method
//! on the Java side shows up as a failed lookup (`None`) here, detected
//! at the next invoke via `exception_check`.

use tracing::debug;

use crate::bridge::{JvmBridge, Tristate};
use crate::object::{CallArg, CallTarget, MethodHandle, OwnedObject, RawObject};

/// Canadian provinces and territories as the forecast library names
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Province {
    Alberta,
    BritishColumbia,
    Manitoba,
    NewBrunswick,
    NewfoundlandAndLabrador,
    NorthwestTerritories,
    NovaScotia,
    Nunavut,
    Ontario,
    PrinceEdwardIsland,
    Quebec,
    Saskatchewan,
    Yukon,
}

impl Province {
    /// Static field name on `ca/weather/forecast/Province`.
    pub fn java_field(self) -> &'static str {
        match self {
            Province::Alberta => "ALBERTA",
            Province::BritishColumbia => "BRITISH_COLUMBIA",
            Province::Manitoba => "MANITOBA",
            Province::NewBrunswick => "NEW_BRUNSWICK",
            Province::NewfoundlandAndLabrador => "NEWFOUNDLAND_AND_LABRADOR",
            Province::NorthwestTerritories => "NORTHWEST_TERRITORIES",
            Province::NovaScotia => "NOVA_SCOTIA",
            Province::Nunavut => "NUNAVUT",
            Province::Ontario => "ONTARIO",
            Province::PrinceEdwardIsland => "PRINCE_EDWARD_ISLAND",
            Province::Quebec => "QUEBEC",
            Province::Saskatchewan => "SASKATCHEWAN",
            Province::Yukon => "YUKON",
        }
    }

    pub const ALL: [Province; 13] = [
        Province::Alberta,
        Province::BritishColumbia,
        Province::Manitoba,
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NorthwestTerritories,
        Province::NovaScotia,
        Province::Nunavut,
        Province::Ontario,
        Province::PrinceEdwardIsland,
        Province::Quebec,
        Province::Saskatchewan,
        Province::Yukon,
    ];
}

/// Forecast weather models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Model {
    GemDeterministic = 0,
    Ncep = 1,
    Gem = 2,
    Both = 3,
    Custom = 4,
}

impl Model {
    pub fn java_field(self) -> &'static str {
        match self {
            Model::GemDeterministic => "GEM_DETER",
            Model::Ncep => "NCEP",
            Model::Gem => "GEM",
            Model::Both => "BOTH",
            Model::Custom => "CUSTOM",
        }
    }
}

/// Forecast issue times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ForecastTime {
    Midnight = 0,
    Noon = 1,
}

impl ForecastTime {
    pub fn java_field(self) -> &'static str {
        match self {
            ForecastTime::Midnight => "MIDNIGHT",
            ForecastTime::Noon => "NOON",
        }
    }
}

/// Reads the static enum constant `class.field` as an object reference.
fn static_enum_object(bridge: &JvmBridge, class_name: &str, field: &str) -> Option<RawObject> {
    let cls = bridge.find_class(class_name)?;
    let sig = format!("L{class_name};");
    let fid = bridge.get_static_field(&cls, field, &sig)?;
    bridge.get_static_object_field(cls.handle, fid)
}

/// `java/util/List` accessors, resolved together since every list walk
/// needs both.
fn list_handles(bridge: &JvmBridge) -> Option<(MethodHandle, MethodHandle)> {
    let list_cls = bridge.find_class("java/util/List")?;
    Some((
        bridge.get_method(&list_cls, "size", "()I")?,
        bridge.get_method(&list_cls, "get", "(I)Ljava/lang/Object;")?,
    ))
}

pub fn province_to_java(bridge: &JvmBridge, province: Province) -> Option<RawObject> {
    static_enum_object(bridge, "ca/weather/forecast/Province", province.java_field())
}

pub fn model_to_java(bridge: &JvmBridge, model: Model) -> Option<RawObject> {
    static_enum_object(bridge, "ca/weather/forecast/Model", model.java_field())
}

pub fn time_to_java(bridge: &JvmBridge, time: ForecastTime) -> Option<RawObject> {
    static_enum_object(bridge, "ca/weather/forecast/Time", time.java_field())
}

/// Asks the managed library whether an internet connection is up.
pub fn internet_detected(bridge: &JvmBridge) -> Tristate {
    let Some(cls) = bridge.find_class("ca/hss/general/WebDownloader") else {
        return Tristate::Invalid;
    };
    let Some(mid) = bridge.get_static_method(&cls, "hasInternetConnection", "()Z") else {
        return Tristate::Invalid;
    };
    bridge.call_tristate(CallTarget::Static(cls.handle), mid, &[])
}

/// Pre-loads the forecast machinery with a throwaway location query so
/// the first real forecast call doesn't pay the class-loading cost.
/// Does nothing when offline or invalid.
pub fn warm_up(bridge: &JvmBridge) {
    if internet_detected(bridge) != Tristate::True {
        return;
    }
    let Some(cls) = bridge.find_class("ca/weather/acheron/Calculator") else {
        return;
    };
    let Some(mid) = bridge.get_static_method(&cls, "getLocations", "()Ljava/util/List;") else {
        return;
    };
    if let Some(list) = bridge.call_object(CallTarget::Static(cls.handle), mid, &[]) {
        bridge.delete_ref(list);
    }
    debug!("forecast machinery warmed up");
}

/// A current-conditions city: its display name plus the managed object
/// the weather constructor wants back.
#[derive(Debug)]
pub struct City {
    pub name: String,
    object: OwnedObject,
}

impl City {
    pub fn dispose(mut self, bridge: &JvmBridge) {
        bridge.dispose(&mut self.object);
    }
}

/// Cities with current-conditions data for a province.
pub fn get_cities(bridge: &JvmBridge, province: Province) -> Vec<City> {
    let Some(jprov) = province_to_java(bridge, province) else {
        return Vec::new();
    };
    let Some(helper) = bridge.find_class("ca/weather/current/Cities/CitiesHelper") else {
        return Vec::new();
    };
    let Some(get_cities) = bridge.get_static_method(
        &helper,
        "getCities",
        "(Lca/weather/forecast/Province;)[Lca/weather/current/Cities/Cities;",
    ) else {
        return Vec::new();
    };
    let Some(array) = bridge.call_object(
        CallTarget::Static(helper.handle),
        get_cities,
        &[CallArg::Object(jprov)],
    ) else {
        return Vec::new();
    };
    let Some(cities_cls) = bridge.find_class("ca/weather/current/Cities/Cities") else {
        return Vec::new();
    };
    let Some(get_name) = bridge.get_method(&cities_cls, "getName", "()Ljava/lang/String;") else {
        return Vec::new();
    };

    let length = bridge.array_length(array);
    let mut cities = Vec::with_capacity(length.max(0) as usize);
    for index in 0..length {
        let Some(city) = bridge.object_array_get(array, index) else {
            continue;
        };
        let name = bridge
            .call_object(CallTarget::Instance(city), get_name, &[])
            .and_then(|jname| {
                let name = bridge.read_string(jname);
                bridge.delete_ref(jname);
                name
            })
            .unwrap_or_default();
        cities.push(City {
            name,
            object: OwnedObject::new(city, cities_cls.clone()),
        });
    }
    bridge.delete_ref(array);
    cities
}

/// A location usable for forecast queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastLocation {
    pub name: String,
}

/// Locations with forecast data for a province. Requires connectivity;
/// offline (or invalid) yields an empty list.
pub fn get_forecast_cities(bridge: &JvmBridge, province: Province) -> Vec<ForecastLocation> {
    if internet_detected(bridge) != Tristate::True {
        return Vec::new();
    }
    let Some(calculator) = bridge.find_class("ca/weather/acheron/Calculator") else {
        return Vec::new();
    };
    let Some(jprov) = province_to_java(bridge, province) else {
        return Vec::new();
    };
    let Some(get_locations) = bridge.get_static_method(
        &calculator,
        "getLocations",
        "(Lca/weather/forecast/Province;)Ljava/util/List;",
    ) else {
        return Vec::new();
    };
    let Some(list) = bridge.call_object(
        CallTarget::Static(calculator.handle),
        get_locations,
        &[CallArg::Object(jprov)],
    ) else {
        return Vec::new();
    };

    let Some((size, get)) = list_handles(bridge) else {
        return Vec::new();
    };
    let Some(location_cls) = bridge.find_class("ca/weather/acheron/Calculator$LocationSmall")
    else {
        return Vec::new();
    };
    let Some(name_fld) = bridge.get_field(&location_cls, "locationName", "Ljava/lang/String;")
    else {
        return Vec::new();
    };

    let count: i32 = bridge.call(CallTarget::Instance(list), size, &[]);
    let mut locations = Vec::with_capacity(count.max(0) as usize);
    for index in 0..count {
        let Some(item) = bridge.call_object(CallTarget::Instance(list), get, &[CallArg::Int(index)])
        else {
            continue;
        };
        if let Some(jname) = bridge.get_object_field(item, name_fld) {
            if let Some(name) = bridge.read_string(jname) {
                locations.push(ForecastLocation { name });
            }
            bridge.delete_ref(jname);
        }
        bridge.delete_ref(item);
    }
    bridge.delete_ref(list);
    locations
}

/// Current observed conditions for one city.
#[derive(Debug)]
pub struct CurrentWeather {
    object: OwnedObject,
}

/// Constructs the current-weather reader for a city. `None` when the
/// runtime is invalid or the managed constructor is missing.
pub fn current_weather(bridge: &JvmBridge, city: &City) -> Option<CurrentWeather> {
    let cls = bridge.find_class("ca/weather/current/CurrentWeather")?;
    let ctor = bridge.get_method(&cls, "<init>", "(Lca/weather/current/Cities/Cities;)V")?;
    let object = bridge.new_object(&cls, ctor, &[CallArg::Object(city.object.raw())])?;
    Some(CurrentWeather { object })
}

impl CurrentWeather {
    fn string_getter(&self, bridge: &JvmBridge, name: &str) -> Option<String> {
        let mid = bridge.get_method(self.object.class(), name, "()Ljava/lang/String;")?;
        let jstr = bridge.call_object(CallTarget::Instance(self.object.raw()), mid, &[])?;
        let value = bridge.read_string(jstr);
        bridge.delete_ref(jstr);
        value
    }

    /// Unboxes a `()Ljava/lang/Double;` getter. A null box means the
    /// feed had no reading; infinity is the long-standing sentinel for
    /// that, and the unboxing call is skipped entirely.
    fn double_getter(&self, bridge: &JvmBridge, name: &str) -> f64 {
        let Some(mid) = bridge.get_method(self.object.class(), name, "()Ljava/lang/Double;")
        else {
            return f64::INFINITY;
        };
        let Some(boxed) = bridge.call_object(CallTarget::Instance(self.object.raw()), mid, &[])
        else {
            return f64::INFINITY;
        };
        let value = bridge
            .find_class("java/lang/Double")
            .and_then(|double_cls| bridge.get_method(&double_cls, "doubleValue", "()D"))
            .map(|double_value| bridge.call(CallTarget::Instance(boxed), double_value, &[]))
            .unwrap_or(f64::INFINITY);
        bridge.delete_ref(boxed);
        value
    }

    pub fn observed(&self, bridge: &JvmBridge) -> Option<String> {
        self.string_getter(bridge, "getObserved")
    }

    pub fn wind_direction(&self, bridge: &JvmBridge) -> Option<String> {
        self.string_getter(bridge, "getWindDirection")
    }

    pub fn temperature(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getTemperature")
    }

    pub fn pressure(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getPressure")
    }

    pub fn visibility(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getVisibility")
    }

    pub fn humidity(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getHumidity")
    }

    pub fn windchill(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getWindchill")
    }

    pub fn dewpoint(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getDewpoint")
    }

    pub fn wind_speed(&self, bridge: &JvmBridge) -> f64 {
        self.double_getter(bridge, "getWindSpeed")
    }

    pub fn dispose(mut self, bridge: &JvmBridge) {
        bridge.dispose(&mut self.object);
    }
}

/// One (hour offset, value) sample for spline interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourValue {
    pub hour_offset: f64,
    pub value: f64,
}

/// Wrapper over the managed spline interpolator.
#[derive(Debug)]
pub struct Interpolator {
    object: OwnedObject,
}

impl Interpolator {
    pub fn new(bridge: &JvmBridge) -> Option<Self> {
        let cls = bridge.find_class("ca/weather/acheron/Interpolator")?;
        let ctor = bridge.get_method(&cls, "<init>", "()V")?;
        let object = bridge.new_object(&cls, ctor, &[])?;
        Some(Interpolator { object })
    }

    /// Marshals the samples into managed `HourValue` objects, runs the
    /// interpolation, and reads the result array back.
    pub fn spline_interpolate(&self, bridge: &JvmBridge, samples: &[HourValue]) -> Vec<HourValue> {
        let Some(hv_cls) = bridge.find_class("ca/weather/acheron/Interpolator$HourValue") else {
            return Vec::new();
        };
        let (Some(ctor), Some(offset_fld), Some(value_fld)) = (
            bridge.get_method(&hv_cls, "<init>", "()V"),
            bridge.get_field(&hv_cls, "houroffset", "D"),
            bridge.get_field(&hv_cls, "value", "D"),
        ) else {
            return Vec::new();
        };
        let Some(array) = bridge.new_object_array(samples.len() as i32, hv_cls.handle) else {
            return Vec::new();
        };
        for (index, sample) in samples.iter().enumerate() {
            let Some(mut element) = bridge.new_object(&hv_cls, ctor, &[]) else {
                continue;
            };
            bridge.set_double_field(element.raw(), offset_fld, sample.hour_offset);
            bridge.set_double_field(element.raw(), value_fld, sample.value);
            bridge.object_array_set(array, index as i32, element.raw());
            // the array now holds its own reference
            bridge.dispose(&mut element);
        }

        let Some(interpolate) = bridge.get_method(
            self.object.class(),
            "splineInterpolate",
            "([Lca/weather/acheron/Interpolator$HourValue;)[Lca/weather/acheron/Interpolator$HourValue;",
        ) else {
            bridge.delete_ref(array);
            return Vec::new();
        };
        let result = bridge.call_object(
            CallTarget::Instance(self.object.raw()),
            interpolate,
            &[CallArg::Object(array)],
        );
        bridge.delete_ref(array);
        let Some(result) = result else {
            return Vec::new();
        };

        let length = bridge.array_length(result);
        let mut values = Vec::with_capacity(length.max(0) as usize);
        for index in 0..length {
            let Some(element) = bridge.object_array_get(result, index) else {
                continue;
            };
            values.push(HourValue {
                hour_offset: bridge.get_double_field(element, offset_fld),
                value: bridge.get_double_field(element, value_fld),
            });
            bridge.delete_ref(element);
        }
        bridge.delete_ref(result);
        values
    }

    pub fn dispose(mut self, bridge: &JvmBridge) {
        bridge.dispose(&mut self.object);
    }
}

/// `java.util.Calendar` field indices used by [`UtcCalendar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CalendarField {
    Year = 1,
    Month = 2,
    DayOfMonth = 5,
    HourOfDay = 11,
    Minute = 12,
    Second = 13,
}

/// Date format the forecast streamable carries.
const CALENDAR_FORMAT: &str = "yyyyMMddHHmmss z";

/// A `java.util.Calendar` pinned to UTC.
#[derive(Debug)]
pub struct UtcCalendar {
    object: OwnedObject,
}

impl UtcCalendar {
    /// Obtains a calendar instance and pins its zone to UTC.
    pub fn new(bridge: &JvmBridge) -> Option<Self> {
        // Resolve every handle up front; lookups hold no references, so
        // a failed one can still bail with plain `?`.
        let cls = bridge.find_class("java/util/Calendar")?;
        let get_instance = bridge.get_static_method(&cls, "getInstance", "()Ljava/util/Calendar;")?;
        let set_time_zone = bridge.get_method(&cls, "setTimeZone", "(Ljava/util/TimeZone;)V")?;
        let tz_cls = bridge.find_class("java/util/TimeZone")?;
        let get_time_zone = bridge.get_static_method(
            &tz_cls,
            "getTimeZone",
            "(Ljava/lang/String;)Ljava/util/TimeZone;",
        )?;

        let raw = bridge.call_object(CallTarget::Static(cls.handle), get_instance, &[])?;
        let mut calendar = UtcCalendar {
            object: OwnedObject::new(raw, cls.clone()),
        };

        let Some(utc) = bridge.new_string("UTC") else {
            bridge.dispose(&mut calendar.object);
            return None;
        };
        let zone = bridge.call_object(
            CallTarget::Static(tz_cls.handle),
            get_time_zone,
            &[CallArg::Object(utc)],
        );
        bridge.delete_ref(utc);
        let Some(zone) = zone else {
            bridge.dispose(&mut calendar.object);
            return None;
        };
        bridge.call::<()>(
            CallTarget::Instance(calendar.object.raw()),
            set_time_zone,
            &[CallArg::Object(zone)],
        );
        bridge.delete_ref(zone);
        Some(calendar)
    }

    pub fn set(&self, bridge: &JvmBridge, field: CalendarField, value: i32) {
        if let Some(mid) = bridge.get_method(self.object.class(), "set", "(II)V") {
            bridge.call::<()>(
                CallTarget::Instance(self.object.raw()),
                mid,
                &[CallArg::Int(field as i32), CallArg::Int(value)],
            );
        }
    }

    pub fn get(&self, bridge: &JvmBridge, field: CalendarField) -> i32 {
        match bridge.get_method(self.object.class(), "get", "(I)I") {
            Some(mid) => bridge.call(
                CallTarget::Instance(self.object.raw()),
                mid,
                &[CallArg::Int(field as i32)],
            ),
            None => 0,
        }
    }

    /// Formats the calendar's instant as `yyyyMMddHHmmss z` in its own
    /// zone.
    pub fn to_text(&self, bridge: &JvmBridge) -> Option<String> {
        let get_time_zone =
            bridge.get_method(self.object.class(), "getTimeZone", "()Ljava/util/TimeZone;")?;
        let get_time = bridge.get_method(self.object.class(), "getTime", "()Ljava/util/Date;")?;
        let fmt_cls = bridge.find_class("java/text/SimpleDateFormat")?;
        let ctor = bridge.get_method(&fmt_cls, "<init>", "(Ljava/lang/String;)V")?;
        let set_time_zone = bridge.get_method(&fmt_cls, "setTimeZone", "(Ljava/util/TimeZone;)V")?;
        let format_mid = bridge.get_method(
            &fmt_cls,
            "format",
            "(Ljava/util/Date;)Ljava/lang/String;",
        )?;

        let format = bridge.new_string(CALENDAR_FORMAT)?;
        let formatter = bridge.new_object(&fmt_cls, ctor, &[CallArg::Object(format)]);
        bridge.delete_ref(format);
        let mut formatter = formatter?;

        let mut text = None;
        if let Some(zone) = bridge.call_object(
            CallTarget::Instance(self.object.raw()),
            get_time_zone,
            &[],
        ) {
            bridge.call::<()>(
                CallTarget::Instance(formatter.raw()),
                set_time_zone,
                &[CallArg::Object(zone)],
            );
            bridge.delete_ref(zone);
            if let Some(time) =
                bridge.call_object(CallTarget::Instance(self.object.raw()), get_time, &[])
            {
                if let Some(jstr) = bridge.call_object(
                    CallTarget::Instance(formatter.raw()),
                    format_mid,
                    &[CallArg::Object(time)],
                ) {
                    text = bridge.read_string(jstr);
                    bridge.delete_ref(jstr);
                }
                bridge.delete_ref(time);
            }
        }
        bridge.dispose(&mut formatter);
        text
    }

    /// Parses `yyyyMMddHHmmss z` text and applies it to the calendar.
    pub fn from_text(&self, bridge: &JvmBridge, value: &str) -> bool {
        let Some(set_time) =
            bridge.get_method(self.object.class(), "setTime", "(Ljava/util/Date;)V")
        else {
            return false;
        };
        let Some(fmt_cls) = bridge.find_class("java/text/SimpleDateFormat") else {
            return false;
        };
        let (Some(ctor), Some(parse)) = (
            bridge.get_method(&fmt_cls, "<init>", "(Ljava/lang/String;)V"),
            bridge.get_method(&fmt_cls, "parse", "(Ljava/lang/String;)Ljava/util/Date;"),
        ) else {
            return false;
        };

        let Some(format) = bridge.new_string(CALENDAR_FORMAT) else {
            return false;
        };
        let formatter = bridge.new_object(&fmt_cls, ctor, &[CallArg::Object(format)]);
        bridge.delete_ref(format);
        let Some(mut formatter) = formatter else {
            return false;
        };

        let mut applied = false;
        if let Some(text) = bridge.new_string(value) {
            let date = bridge.call_object(
                CallTarget::Instance(formatter.raw()),
                parse,
                &[CallArg::Object(text)],
            );
            bridge.delete_ref(text);
            if let Some(date) = date {
                bridge.call::<()>(
                    CallTarget::Instance(self.object.raw()),
                    set_time,
                    &[CallArg::Object(date)],
                );
                bridge.delete_ref(date);
                applied = true;
            }
        }
        bridge.dispose(&mut formatter);
        applied
    }

    pub fn dispose(mut self, bridge: &JvmBridge) {
        bridge.dispose(&mut self.object);
    }
}

/// Prefix that marks serialized forecast requests.
pub const STREAMABLE_PREFIX: &str = "ACHERON";

const STREAMABLE_VERSION: i32 = 1;

/// A forecast request, serializable to the streamable wire form.
///
/// Parsing a streamable back is deliberately unimplemented; nothing has
/// ever produced one that this process didn't write itself.
#[derive(Debug, Clone)]
pub struct ForecastCalculator {
    pub model: Model,
    pub time: ForecastTime,
    pub timezone: i32,
    pub location_name: String,
    /// Calendar text in the `yyyyMMddHHmmss z` form.
    pub date_text: String,
    /// Ensemble members, only meaningful for [`Model::Custom`].
    pub members: Vec<i32>,
    /// Ensemble percentile; only applied when strictly between 0 and
    /// 100.
    pub percentile: Option<i32>,
}

impl ForecastCalculator {
    pub fn new(location_name: impl Into<String>) -> Self {
        ForecastCalculator {
            model: Model::GemDeterministic,
            time: ForecastTime::Midnight,
            timezone: 0,
            location_name: location_name.into(),
            date_text: String::new(),
            members: Vec::new(),
            percentile: None,
        }
    }

    /// Serializes the request; every field is semicolon-terminated.
    pub fn to_streamable(&self) -> String {
        let mut out = format!(
            "{STREAMABLE_PREFIX};{STREAMABLE_VERSION};{};{};{};{};{};",
            self.model as i32, self.location_name, self.timezone, self.date_text, self.time as i32,
        );
        for member in &self.members {
            out.push_str(&member.to_string());
            out.push(';');
        }
        out
    }

    /// Whether `text` is a serialized forecast request.
    pub fn is_streamable(text: &str) -> bool {
        text.starts_with(STREAMABLE_PREFIX)
    }

    /// Pushes this request into the managed calculator, runs it, and
    /// returns the first location's weather data.
    ///
    /// `None` when the runtime is invalid, no location is set, or the
    /// managed `calculate` reports failure. The calculation always runs
    /// against the UTC zone; [`timezone`](Self::timezone) only travels
    /// in the streamable form.
    pub fn calculate(&self, bridge: &JvmBridge) -> Option<LocationWeather> {
        if self.location_name.is_empty() {
            return None;
        }
        let calc_cls = bridge.find_class("ca/weather/acheron/Calculator")?;
        let ctor = bridge.get_method(&calc_cls, "<init>", "()V")?;
        let set_location = bridge.get_method(&calc_cls, "setLocation", "(Ljava/lang/String;)V")?;
        let set_model =
            bridge.get_method(&calc_cls, "setModel", "(Lca/weather/forecast/Model;)V")?;
        let set_time = bridge.get_method(&calc_cls, "setTime", "(Lca/weather/forecast/Time;)V")?;
        let set_timezone =
            bridge.get_method(&calc_cls, "setTimezone", "(Lca/hss/times/TimeZoneInfo;)V")?;
        let set_date = bridge.get_method(&calc_cls, "setDate", "(Ljava/util/Calendar;)V")?;
        let run = bridge.get_method(&calc_cls, "calculate", "()Z")?;
        let weather_data = bridge.get_method(
            &calc_cls,
            "getLocationsWeatherData",
            "(I)Lca/weather/acheron/LocationWeather;",
        )?;
        let weather_cls = bridge.find_class("ca/weather/acheron/LocationWeather")?;
        let world_cls = bridge.find_class("ca/hss/times/WorldLocation")?;
        let zone_from_offset = bridge.get_static_method(
            &world_cls,
            "getTimeZoneFromOffset",
            "(I)Lca/hss/times/TimeZoneInfo;",
        )?;

        let mut calculator = bridge.new_object(&calc_cls, ctor, &[])?;
        let target = CallTarget::Instance(calculator.raw());
        let mut ok = true;

        if let Some(name) = bridge.new_string(&self.location_name) {
            bridge.call::<()>(target, set_location, &[CallArg::Object(name)]);
            bridge.delete_ref(name);
        } else {
            ok = false;
        }
        if let Some(jmodel) = model_to_java(bridge, self.model) {
            bridge.call::<()>(target, set_model, &[CallArg::Object(jmodel)]);
            bridge.delete_ref(jmodel);
        } else {
            ok = false;
        }
        if let Some(jtime) = time_to_java(bridge, self.time) {
            bridge.call::<()>(target, set_time, &[CallArg::Object(jtime)]);
            bridge.delete_ref(jtime);
        } else {
            ok = false;
        }
        if self.model == Model::Custom {
            if let (Some(clear), Some(add)) = (
                bridge.get_method(&calc_cls, "clearMembers", "()V"),
                bridge.get_method(&calc_cls, "addMember", "(I)V"),
            ) {
                bridge.call::<()>(target, clear, &[]);
                for member in &self.members {
                    bridge.call::<()>(target, add, &[CallArg::Int(*member)]);
                }
            } else {
                ok = false;
            }
        }
        if let Some(zone) = bridge.call_object(
            CallTarget::Static(world_cls.handle),
            zone_from_offset,
            &[CallArg::Int(0)],
        ) {
            bridge.call::<()>(target, set_timezone, &[CallArg::Object(zone)]);
            bridge.delete_ref(zone);
        } else {
            ok = false;
        }
        match UtcCalendar::new(bridge) {
            Some(date) => {
                if self.date_text.is_empty() || date.from_text(bridge, &self.date_text) {
                    bridge.call::<()>(target, set_date, &[CallArg::Object(date.object.raw())]);
                } else {
                    ok = false;
                }
                date.dispose(bridge);
            }
            None => ok = false,
        }
        if let Some(percentile) = self.percentile {
            if (1..100).contains(&percentile) {
                if let Some(set_percentile) =
                    bridge.get_method(&calc_cls, "setPercentile", "(I)V")
                {
                    bridge.call::<()>(target, set_percentile, &[CallArg::Int(percentile)]);
                }
            }
        }

        let weather = if ok && bridge.call::<bool>(target, run, &[]) {
            bridge.call_object(target, weather_data, &[CallArg::Int(0)])
        } else {
            None
        };
        bridge.dispose(&mut calculator);
        weather.map(|raw| LocationWeather {
            object: OwnedObject::new(raw, weather_cls.clone()),
        })
    }
}

/// Hourly values read back from a forecast calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastHour {
    pub temperature: f64,
    /// Fraction in `[0, 1]`; the managed side reports percent.
    pub relative_humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    /// Whether the managed side interpolated this hour rather than
    /// observing it.
    pub interpolated: bool,
}

/// Calculated weather for one forecast location, read back hour by
/// hour.
#[derive(Debug)]
pub struct LocationWeather {
    object: OwnedObject,
}

impl LocationWeather {
    /// Number of forecast hours available.
    pub fn len(&self, bridge: &JvmBridge) -> usize {
        let Some(get_hours) =
            bridge.get_method(self.object.class(), "getHourData", "()Ljava/util/List;")
        else {
            return 0;
        };
        let Some((size, _)) = list_handles(bridge) else {
            return 0;
        };
        let Some(list) =
            bridge.call_object(CallTarget::Instance(self.object.raw()), get_hours, &[])
        else {
            return 0;
        };
        let count: i32 = bridge.call(CallTarget::Instance(list), size, &[]);
        bridge.delete_ref(list);
        count.max(0) as usize
    }

    pub fn is_empty(&self, bridge: &JvmBridge) -> bool {
        self.len(bridge) == 0
    }

    /// Reads every forecast hour.
    pub fn hours(&self, bridge: &JvmBridge) -> Vec<ForecastHour> {
        let Some(get_hours) =
            bridge.get_method(self.object.class(), "getHourData", "()Ljava/util/List;")
        else {
            return Vec::new();
        };
        let Some((size, get)) = list_handles(bridge) else {
            return Vec::new();
        };
        let Some(hour_cls) = bridge.find_class("ca/weather/acheron/Hour") else {
            return Vec::new();
        };
        let method = |name: &str, sig: &str| bridge.get_method(&hour_cls, name, sig);
        let (Some(temp), Some(rh), Some(precip), Some(ws), Some(wd), Some(interp)) = (
            method("getTemperature", "()D"),
            method("getRelativeHumidity", "()D"),
            method("getPrecipitation", "()D"),
            method("getWindSpeed", "()D"),
            method("getWindDirection", "()D"),
            method("isInterpolated", "()Z"),
        ) else {
            return Vec::new();
        };

        let Some(list) =
            bridge.call_object(CallTarget::Instance(self.object.raw()), get_hours, &[])
        else {
            return Vec::new();
        };
        let count: i32 = bridge.call(CallTarget::Instance(list), size, &[]);
        let mut hours = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let Some(item) =
                bridge.call_object(CallTarget::Instance(list), get, &[CallArg::Int(index)])
            else {
                continue;
            };
            let target = CallTarget::Instance(item);
            hours.push(ForecastHour {
                temperature: bridge.call(target, temp, &[]),
                relative_humidity: bridge.call::<f64>(target, rh, &[]) / 100.0,
                precipitation: bridge.call(target, precip, &[]),
                wind_speed: bridge.call(target, ws, &[]),
                wind_direction: bridge.call(target, wd, &[]),
                interpolated: bridge.call(target, interp, &[]),
            });
            bridge.delete_ref(item);
        }
        bridge.delete_ref(list);
        hours
    }

    /// Calendar date of the first forecast hour.
    pub fn start_date(&self, bridge: &JvmBridge) -> Option<UtcCalendar> {
        let get_hours =
            bridge.get_method(self.object.class(), "getHourData", "()Ljava/util/List;")?;
        let (_, get) = list_handles(bridge)?;
        let hour_cls = bridge.find_class("ca/weather/acheron/Hour")?;
        let get_date = bridge.get_method(&hour_cls, "getCalendarDate", "()Ljava/util/Calendar;")?;
        let cal_cls = bridge.find_class("java/util/Calendar")?;

        let list = bridge.call_object(CallTarget::Instance(self.object.raw()), get_hours, &[])?;
        let first = bridge.call_object(CallTarget::Instance(list), get, &[CallArg::Int(0)]);
        bridge.delete_ref(list);
        let first = first?;
        let raw = bridge.call_object(CallTarget::Instance(first), get_date, &[]);
        bridge.delete_ref(first);
        Some(UtcCalendar {
            object: OwnedObject::new(raw?, cal_cls.clone()),
        })
    }

    pub fn dispose(mut self, bridge: &JvmBridge) {
        bridge.dispose(&mut self.object);
    }
}

/// How hourly-import treats rows that fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PurgeMode {
    Failure = 0,
    Allow = 1,
    Fix = 2,
}

/// One imported weather observation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherRow {
    pub hour: f64,
    pub epoch_seconds: i64,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub wind_direction: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub precipitation: f64,
    pub ffmc: f64,
    pub dmc: f64,
    pub dc: f64,
    pub bui: f64,
    pub isi: f64,
    pub fwi: f64,
    pub options: i32,
}

impl Default for WeatherRow {
    fn default() -> Self {
        WeatherRow {
            hour: 0.0,
            epoch_seconds: 0,
            temperature: 0.0,
            relative_humidity: 0.0,
            wind_direction: 0.0,
            wind_speed: 0.0,
            // no gust column in the feed; negative marks "not provided"
            wind_gust: -1.0,
            precipitation: 0.0,
            ffmc: -1.0,
            dmc: -1.0,
            dc: -1.0,
            bui: -1.0,
            isi: -1.0,
            fwi: -1.0,
            options: 0,
        }
    }
}

/// Result of an hourly import: the managed library's result code plus
/// the rows it produced (empty unless the code is accepted).
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyImport {
    pub result_code: i64,
    pub rows: Vec<WeatherRow>,
}

/// Import result codes that still carry usable rows.
const HOURLY_OK_CODES: [i64; 4] = [0, 12803, 12805, 0x8000_000d];

/// Wrapper over the managed weather-stream condition object.
#[derive(Debug)]
pub struct WeatherStream {
    object: OwnedObject,
}

impl WeatherStream {
    pub fn new(bridge: &JvmBridge) -> Option<Self> {
        let cls = bridge.find_class("ca/cwfgm/weather/WeatherCondition")?;
        let ctor = bridge.get_method(&cls, "<init>", "()V")?;
        let object = bridge.new_object(&cls, ctor, &[])?;
        Some(WeatherStream { object })
    }

    fn call_double_setter(&self, bridge: &JvmBridge, name: &str, value: f64) {
        if let Some(mid) = bridge.get_method(self.object.class(), name, "(D)V") {
            bridge.call::<()>(
                CallTarget::Instance(self.object.raw()),
                mid,
                &[CallArg::Double(value)],
            );
        }
    }

    fn call_long_setter(&self, bridge: &JvmBridge, name: &str, value: i64) {
        if let Some(mid) = bridge.get_method(self.object.class(), name, "(J)V") {
            bridge.call::<()>(
                CallTarget::Instance(self.object.raw()),
                mid,
                &[CallArg::Long(value)],
            );
        }
    }

    pub fn set_latitude(&self, bridge: &JvmBridge, latitude: f64) {
        self.call_double_setter(bridge, "setLatitude", latitude);
    }

    pub fn set_longitude(&self, bridge: &JvmBridge, longitude: f64) {
        self.call_double_setter(bridge, "setLongitude", longitude);
    }

    pub fn set_timezone(&self, bridge: &JvmBridge, offset_seconds: i64) {
        self.call_long_setter(bridge, "setTimezone", offset_seconds);
    }

    pub fn set_daylight_savings(&self, bridge: &JvmBridge, amount_seconds: i64) {
        self.call_long_setter(bridge, "setDaylightSavings", amount_seconds);
    }

    pub fn set_daylight_savings_start(&self, bridge: &JvmBridge, offset_seconds: i64) {
        self.call_long_setter(bridge, "setDaylightSavingsStart", offset_seconds);
    }

    pub fn set_daylight_savings_end(&self, bridge: &JvmBridge, offset_seconds: i64) {
        self.call_long_setter(bridge, "setDaylightSavingsEnd", offset_seconds);
    }

    /// Imports an hourly weather file through the managed library.
    ///
    /// The hour-result code comes back through an `OutVariable` holding
    /// a boxed `Long`; rows are only read when the code is one of the
    /// accepted values. Returns `None` when the runtime is invalid or a
    /// required managed member is missing.
    pub fn import_hourly(
        &self,
        bridge: &JvmBridge,
        path: &str,
        purge: PurgeMode,
    ) -> Option<HourlyImport> {
        // Resolve every handle before acquiring references; from here
        // down each exit path releases what it holds.
        let outvar_cls = bridge.find_class("ca/hss/general/OutVariable")?;
        let outvar_ctor = bridge.get_method(&outvar_cls, "<init>", "()V")?;
        let value_fld = bridge.get_field(&outvar_cls, "value", "Ljava/lang/Object;")?;
        let long_cls = bridge.find_class("java/lang/Long")?;
        let long_ctor = bridge.get_method(&long_cls, "<init>", "(J)V")?;
        let long_value = bridge.get_method(&long_cls, "longValue", "()J")?;

        // Newer library versions take the purge mode; fall back to the
        // two-argument form when it is absent.
        let (import_mid, with_purge) = match bridge.get_method(
            self.object.class(),
            "importHourly",
            "(Ljava/lang/String;Lca/hss/general/OutVariable;I)Ljava/util/List;",
        ) {
            Some(mid) => (mid, true),
            None => (
                bridge.get_method(
                    self.object.class(),
                    "importHourly",
                    "(Ljava/lang/String;Lca/hss/general/OutVariable;)Ljava/util/List;",
                )?,
                false,
            ),
        };

        let mut outvar = bridge.new_object(&outvar_cls, outvar_ctor, &[])?;
        let Some(mut zero) = bridge.new_object(&long_cls, long_ctor, &[CallArg::Long(0)]) else {
            bridge.dispose(&mut outvar);
            return None;
        };
        bridge.set_object_field(outvar.raw(), value_fld, zero.raw());

        let Some(filename) = bridge.new_string(path) else {
            bridge.dispose(&mut outvar);
            bridge.dispose(&mut zero);
            return None;
        };

        let result = if with_purge {
            bridge.call_object(
                CallTarget::Instance(self.object.raw()),
                import_mid,
                &[
                    CallArg::Object(filename),
                    CallArg::Object(outvar.raw()),
                    CallArg::Int(purge as i32),
                ],
            )
        } else {
            bridge.call_object(
                CallTarget::Instance(self.object.raw()),
                import_mid,
                &[CallArg::Object(filename), CallArg::Object(outvar.raw())],
            )
        };

        let result_code = match bridge.get_object_field(outvar.raw(), value_fld) {
            Some(boxed) => {
                let code: i64 = bridge.call(CallTarget::Instance(boxed), long_value, &[]);
                bridge.delete_ref(boxed);
                code
            }
            None => 0,
        };

        bridge.delete_ref(filename);
        bridge.dispose(&mut outvar);
        bridge.dispose(&mut zero);

        let rows = match result {
            Some(list) if HOURLY_OK_CODES.contains(&result_code) => {
                let rows = self.read_rows(bridge, list);
                bridge.delete_ref(list);
                rows
            }
            Some(list) => {
                bridge.delete_ref(list);
                Vec::new()
            }
            None => Vec::new(),
        };
        if rows.is_empty() && bridge.exception_check() {
            debug!("hourly import left a pending Java exception");
        }
        Some(HourlyImport { result_code, rows })
    }

    fn read_rows(&self, bridge: &JvmBridge, list: RawObject) -> Vec<WeatherRow> {
        let Some((size, get)) = list_handles(bridge) else {
            return Vec::new();
        };
        let Some(row_cls) =
            bridge.find_class("ca/cwfgm/weather/WeatherCondition$WeatherCollection")
        else {
            return Vec::new();
        };

        let field = |name: &str, sig: &str| bridge.get_field(&row_cls, name, sig);
        let (
            Some(hour),
            Some(epoch),
            Some(temp),
            Some(rh),
            Some(wd),
            Some(ws),
            Some(precip),
            Some(ffmc),
            Some(dmc),
            Some(dc),
            Some(bui),
            Some(isi),
            Some(fwi),
            Some(options),
        ) = (
            field("hour", "D"),
            field("epoch", "J"),
            field("temp", "D"),
            field("rh", "D"),
            field("wd", "D"),
            field("ws", "D"),
            field("precip", "D"),
            field("ffmc", "D"),
            field("DMC", "D"),
            field("DC", "D"),
            field("BUI", "D"),
            field("ISI", "D"),
            field("FWI", "D"),
            field("options", "I"),
        )
        else {
            return Vec::new();
        };

        let count: i32 = bridge.call(CallTarget::Instance(list), size, &[]);
        let mut rows = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let Some(item) = bridge.call_object(
                CallTarget::Instance(list),
                get,
                &[CallArg::Int(index)],
            ) else {
                continue;
            };
            rows.push(WeatherRow {
                hour: bridge.get_double_field(item, hour),
                epoch_seconds: bridge.get_long_field(item, epoch),
                temperature: bridge.get_double_field(item, temp),
                relative_humidity: bridge.get_double_field(item, rh),
                wind_direction: bridge.get_double_field(item, wd),
                wind_speed: bridge.get_double_field(item, ws),
                precipitation: bridge.get_double_field(item, precip),
                ffmc: bridge.get_double_field(item, ffmc),
                dmc: bridge.get_double_field(item, dmc),
                dc: bridge.get_double_field(item, dc),
                bui: bridge.get_double_field(item, bui),
                isi: bridge.get_double_field(item, isi),
                fwi: bridge.get_double_field(item, fwi),
                options: bridge.get_int_field(item, options),
                ..WeatherRow::default()
            });
            bridge.delete_ref(item);
        }
        rows
    }

    pub fn dispose(mut self, bridge: &JvmBridge) {
        bridge.dispose(&mut self.object);
    }
}
