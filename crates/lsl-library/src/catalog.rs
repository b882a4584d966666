// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Core catalog of the standard LSL library.
//!
//! Not exhaustive. Runtimes with a larger surface load their own data with
//! [`StaticLibrary::from_json`](crate::StaticLibrary::from_json).

use lsl_ast::LslType::{self, Float, Integer, Key, List, Rotation, String, Vector, Void};

use crate::signature::{LibraryConstant, LibraryEvent, LibraryFunction, LibraryParam};

type Params = &'static [(&'static str, LslType)];

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

const FUNCTIONS: &[(&str, LslType, Params)] = &[
    // Chat and communication
    ("llSay", Void, &[("channel", Integer), ("msg", String)]),
    ("llShout", Void, &[("channel", Integer), ("msg", String)]),
    ("llWhisper", Void, &[("channel", Integer), ("msg", String)]),
    ("llOwnerSay", Void, &[("msg", String)]),
    ("llRegionSay", Void, &[("channel", Integer), ("msg", String)]),
    ("llInstantMessage", Void, &[("user", Key), ("message", String)]),
    ("llListen", Integer, &[("channel", Integer), ("name", String), ("id", Key), ("msg", String)]),
    ("llListenRemove", Void, &[("handle", Integer)]),
    ("llMessageLinked", Void, &[("link", Integer), ("num", Integer), ("str", String), ("id", Key)]),
    // Math
    ("llAbs", Integer, &[("val", Integer)]),
    ("llFabs", Float, &[("val", Float)]),
    ("llFrand", Float, &[("mag", Float)]),
    ("llFloor", Integer, &[("val", Float)]),
    ("llCeil", Integer, &[("val", Float)]),
    ("llRound", Integer, &[("val", Float)]),
    ("llSqrt", Float, &[("val", Float)]),
    ("llPow", Float, &[("base", Float), ("exponent", Float)]),
    ("llSin", Float, &[("theta", Float)]),
    ("llCos", Float, &[("theta", Float)]),
    ("llVecMag", Float, &[("v", Vector)]),
    ("llVecNorm", Vector, &[("v", Vector)]),
    ("llVecDist", Float, &[("v1", Vector), ("v2", Vector)]),
    ("llEuler2Rot", Rotation, &[("v", Vector)]),
    ("llRot2Euler", Vector, &[("q", Rotation)]),
    // Strings
    ("llStringLength", Integer, &[("str", String)]),
    ("llGetSubString", String, &[("src", String), ("start", Integer), ("end", Integer)]),
    ("llSubStringIndex", Integer, &[("source", String), ("pattern", String)]),
    ("llToUpper", String, &[("src", String)]),
    ("llToLower", String, &[("src", String)]),
    ("llStringTrim", String, &[("src", String), ("type", Integer)]),
    // Lists
    ("llGetListLength", Integer, &[("src", List)]),
    ("llList2String", String, &[("src", List), ("index", Integer)]),
    ("llList2Integer", Integer, &[("src", List), ("index", Integer)]),
    ("llList2Float", Float, &[("src", List), ("index", Integer)]),
    ("llList2Key", Key, &[("src", List), ("index", Integer)]),
    ("llList2Vector", Vector, &[("src", List), ("index", Integer)]),
    ("llList2List", List, &[("src", List), ("start", Integer), ("end", Integer)]),
    ("llListSort", List, &[("src", List), ("stride", Integer), ("ascending", Integer)]),
    ("llDumpList2String", String, &[("src", List), ("separator", String)]),
    ("llParseString2List", List, &[("src", String), ("separators", List), ("spacers", List)]),
    ("llListFindList", Integer, &[("src", List), ("test", List)]),
    // Object and world
    ("llGetPos", Vector, &[]),
    ("llSetPos", Void, &[("pos", Vector)]),
    ("llGetRot", Rotation, &[]),
    ("llSetRot", Void, &[("rot", Rotation)]),
    ("llGetKey", Key, &[]),
    ("llGetOwner", Key, &[]),
    ("llGetObjectName", String, &[]),
    ("llSetText", Void, &[("text", String), ("color", Vector), ("alpha", Float)]),
    ("llSetColor", Void, &[("color", Vector), ("face", Integer)]),
    ("llDetectedKey", Key, &[("number", Integer)]),
    ("llDetectedName", String, &[("number", Integer)]),
    ("llKey2Name", String, &[("id", Key)]),
    // Timing and script control
    ("llGetTime", Float, &[]),
    ("llResetTime", Void, &[]),
    ("llGetUnixTime", Integer, &[]),
    ("llSetTimerEvent", Void, &[("sec", Float)]),
    ("llSleep", Void, &[("sec", Float)]),
    ("llResetScript", Void, &[]),
    ("llDie", Void, &[]),
];

const DEPRECATED_FUNCTIONS: &[(&str, LslType, Params)] = &[
    ("llSound", Void, &[("sound", String), ("volume", Float), ("queue", Integer), ("loop", Integer)]),
    ("llMakeExplosion", Void, &[
        ("particles", Integer), ("scale", Float), ("vel", Float), ("lifetime", Float),
        ("arc", Float), ("texture", String), ("offset", Vector),
    ]),
    ("llRemoteLoadScript", Void, &[("target", Key), ("name", String), ("running", Integer), ("start_param", Integer)]),
];

pub(crate) fn functions() -> Vec<LibraryFunction> {
    let build = |&(name, ret, params): &(&str, LslType, Params)| {
        LibraryFunction::new(name, ret, params.iter().map(|&(n, t)| LibraryParam::new(n, t)).collect())
    };
    FUNCTIONS
        .iter()
        .map(build)
        .chain(DEPRECATED_FUNCTIONS.iter().map(|f| build(f).deprecated()))
        .collect()
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const CONSTANTS: &[(&str, LslType, &str)] = &[
    ("TRUE", Integer, "1"),
    ("FALSE", Integer, "0"),
    ("PI", Float, "3.14159265"),
    ("TWO_PI", Float, "6.28318530"),
    ("PI_BY_TWO", Float, "1.57079633"),
    ("DEG_TO_RAD", Float, "0.01745329"),
    ("RAD_TO_DEG", Float, "57.29578"),
    ("SQRT2", Float, "1.41421356"),
    ("ZERO_VECTOR", Vector, "<0.0, 0.0, 0.0>"),
    ("ZERO_ROTATION", Rotation, "<0.0, 0.0, 0.0, 1.0>"),
    ("NULL_KEY", Key, "\"00000000-0000-0000-0000-000000000000\""),
    ("EOF", String, "\"\\n\\n\\n\""),
    ("PUBLIC_CHANNEL", Integer, "0"),
    ("DEBUG_CHANNEL", Integer, "2147483647"),
    ("ALL_SIDES", Integer, "-1"),
    ("LINK_SET", Integer, "-1"),
    ("LINK_ROOT", Integer, "1"),
    ("LINK_ALL_OTHERS", Integer, "-2"),
    ("LINK_ALL_CHILDREN", Integer, "-3"),
    ("LINK_THIS", Integer, "-4"),
    ("AGENT", Integer, "1"),
    ("ACTIVE", Integer, "2"),
    ("PASSIVE", Integer, "4"),
    ("SCRIPTED", Integer, "8"),
    ("CHANGED_INVENTORY", Integer, "1"),
    ("CHANGED_OWNER", Integer, "128"),
    ("STRING_TRIM", Integer, "3"),
];

const DEPRECATED_CONSTANTS: &[(&str, LslType, &str)] = &[
    ("PRIM_CAST_SHADOWS", Integer, "24"),
    ("LAND_LARGE_BRUSH", Integer, "3"),
];

pub(crate) fn constants() -> Vec<LibraryConstant> {
    let build = |&(name, ty, value): &(&str, LslType, &str)| {
        let c = LibraryConstant::new(name, ty, value);
        // The host runtime does not define these as named members.
        if matches!(ty, Vector | Rotation | Key | String) {
            c.expand()
        } else {
            c
        }
    };
    CONSTANTS
        .iter()
        .map(build)
        .chain(DEPRECATED_CONSTANTS.iter().map(|c| build(c).deprecated()))
        .collect()
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

const EVENTS: &[(&str, Params)] = &[
    ("state_entry", &[]),
    ("state_exit", &[]),
    ("on_rez", &[("start_param", Integer)]),
    ("touch_start", &[("num_detected", Integer)]),
    ("touch", &[("num_detected", Integer)]),
    ("touch_end", &[("num_detected", Integer)]),
    ("collision_start", &[("num_detected", Integer)]),
    ("timer", &[]),
    ("listen", &[("channel", Integer), ("name", String), ("id", Key), ("message", String)]),
    ("link_message", &[("sender_num", Integer), ("num", Integer), ("str", String), ("id", Key)]),
    ("changed", &[("change", Integer)]),
    ("attach", &[("id", Key)]),
    ("sensor", &[("num_detected", Integer)]),
    ("no_sensor", &[]),
    ("dataserver", &[("queryid", Key), ("data", String)]),
    ("http_response", &[("request_id", Key), ("status", Integer), ("metadata", List), ("body", String)]),
];

pub(crate) fn events() -> Vec<LibraryEvent> {
    EVENTS
        .iter()
        .map(|&(name, params)| {
            LibraryEvent::new(name, params.iter().map(|&(n, t)| LibraryParam::new(n, t)).collect())
        })
        .collect()
}
