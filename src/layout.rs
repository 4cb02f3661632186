//! The hand-mapped MiniFreak V control surface.
//!
//! Pixel anchors were captured with the window at [`REFERENCE`]. Declarations
//! are ordered leaf-first: every control is registered after the tabs and
//! panels its visibility depends on.

use crate::affordance::{
    Declaration, Precondition, Rect, Registry, RegistryBuilder, Requirement,
};
use crate::error::RegistryError;

/// Window rectangle the anchors below were measured against.
pub const REFERENCE: Rect = Rect::new(4, 23, 1946, 1318);

/// Sustain pedal affordance.
pub const SUSTAIN: &str = "hold_pedal";
pub const NOTE: &str = "note";

const LFO_RATE_TYPES: &[&str] = &["Free", "All", "Straight", "Triplet", "Dotted"];
const RISING_CURVES: &[&str] = &["Quick", "Linear"];
const ATTACK_CURVES: &[&str] = &["Default", "Quick"];
const FALLING_CURVES: &[&str] = &["Default", "Percussive"];
const GLIDE_TYPES: &[&str] = &[
    "Time",
    "Time_Legato",
    "Rate",
    "Rate_Legato",
    "Sync",
    "Sync_Legato",
];
const STAGE_ORDERS: &[&str] = &["Rise_Hold_Fall", "Rise_Fall_Hold", "Hold_Rise_Fall"];
const KBD_RETRIGGER: &[&str] = &["Poly_Kbd", "Mono_Kbd", "Legato_Kbd"];

const OSC_1_TYPES: &[&str] = &[
    "Basic_Waves",
    "SuperWave",
    "Harmo",
    "KarplusStr",
    "VAnalog",
    "Waveshaper",
    "Two_Op_FM",
    "Formant",
    "Speech",
    "Modal",
    "Noise",
    "Bass",
    "SawX",
    "Harm",
    "Audio_In",
    "Wavetable",
];

const FX_TYPES: &[&str] = &[
    "Chorus",
    "Phaser",
    "Flanger",
    "Distortion",
    "Bit_Crusher",
    "3_Bands_EQ",
    "Peak_EQ",
    "Multi_Comp",
    "SuperUnison",
    "Reverb",
    "Delay",
];

const FX_SLOTS: &[&str] = &["FX_1", "FX_2", "FX_3"];

const ROUTING_SLOTS_ADVANCED: &[&str] = &[
    "Macro_1_1", "Macro_1_2", "Macro_1_3", "Macro_1_4", "Macro_2_1", "Macro_2_2", "Macro_2_3",
    "Macro_2_4", "Matrix_5", "Matrix_6", "Matrix_7", "Matrix_8", "Matrix_9", "Matrix_10",
    "Matrix_11", "Matrix_12", "Matrix_13",
];
const ROUTING_SLOTS_SEQUENCER: &[&str] = &["mod_src_1", "mod_src_2", "mod_src_3", "mod_src_4"];

#[rustfmt::skip]
const ROUTING_SLOT_ANCHORS: &[(i32, i32)] = &[
    (422, 1032), (425, 1094), (434, 1151), (439, 1212),
    (718, 1032), (710, 1094), (711, 1153), (715, 1215),
    (1326, 1003), (1386, 998), (1444, 998),
    (1496, 1001), (1556, 997), (1607, 1009),
    (1664, 1003), (1724, 1000), (1782, 1000),
    (141, 1042), (137, 1095), (139, 1148), (138, 1206),
];

/// Routing destinations and where to click them. The three FX slots share
/// the same on-screen destinations; only the FX tab decides which one is live.
#[rustfmt::skip]
const ROUTING_ASSIGNMENTS: &[(&str, (i32, i32))] = &[
    ("uni_spread", (479, 713)), ("vibrato_rate", (210, 1047)),
    ("type_osc_1", (468, 198)), ("tune_osc_1", (97, 432)), ("wave_osc_1", (195, 431)),
    ("timbre_osc_1", (292, 430)), ("shape_osc_1", (380, 431)), ("volume_osc_1", (474, 432)),
    ("type_osc_2", (1001, 197)), ("tune_osc_2", (627, 432)), ("wave_osc_2", (725, 431)),
    ("timbre_osc_2", (818, 433)), ("shape_osc_2", (907, 428)), ("volume_osc_2", (999, 433)),
    ("cutoff_filter", (1169, 431)), ("reso_filter", (1269, 433)), ("env_amt_filter", (1374, 430)),
    ("time_fx1", (1640, 428)), ("intensity_fx1", (1729, 432)), ("amount_fx1", (1827, 431)),
    ("time_fx2", (1640, 428)), ("intensity_fx2", (1729, 432)), ("amount_fx2", (1827, 431)),
    ("time_fx3", (1640, 428)), ("intensity_fx3", (1729, 432)), ("amount_fx3", (1827, 431)),
    ("glide", (470, 776)), ("rate_lfo1", (639, 773)), ("rate_lfo2", (900, 774)),
    ("wave_lfo1", (741, 776)), ("wave_lfo2", (1003, 773)), ("rise_cycenv", (1165, 774)),
    ("fall_cycenv", (1272, 777)), ("hold_cycenv", (1376, 777)), ("attack_env", (1540, 774)),
    ("decay_env", (1637, 777)), ("sustain_env", (1735, 776)), ("release_env", (1837, 776)),
];

#[rustfmt::skip]
const CHORD_NOTES: &[(&str, (i32, i32), (i32, i32))] = &[
    // (note, chord tab anchor, scale tab anchor)
    ("c", (92, 651), (97, 675)), ("c_shp", (101, 624), (109, 649)),
    ("d", (113, 648), (119, 674)), ("d_shp", (125, 623), (132, 646)),
    ("e", (140, 649), (141, 673)),
    ("f", (163, 648), (160, 675)), ("f_shp", (173, 624), (174, 647)),
    ("g", (186, 648), (183, 673)), ("g_shp", (199, 625), (195, 648)),
    ("a", (211, 648), (202, 673)), ("a_shp", (220, 623), (216, 649)),
    ("b", (235, 648), (225, 674)),
];

/// Continuous controllers of the hardware, by CC number.
#[rustfmt::skip]
const MIDI_SLIDERS: &[(&str, u8)] = &[
    ("mod_wheel", 1), ("glide", 5),
    ("tune_osc_1", 70), ("wave_osc_1", 14), ("timbre_osc_1", 15), ("shape_osc_1", 16),
    ("volume_osc_1", 17),
    ("tune_osc_2", 73), ("wave_osc_2", 18), ("timbre_osc_2", 19), ("shape_osc_2", 20),
    ("volume_osc_2", 21),
    ("cutoff", 74), ("resonance", 71), ("env_mod", 94), ("env_amt", 24),
    ("rise", 76), ("rise_shape", 68), ("fall", 77), ("fall_shape", 69), ("hold", 78),
    ("attack", 80), ("decay", 81), ("sustain", 82), ("release", 83),
    ("rate_lfo_1", 85), ("rate_lfo_2", 87),
    ("time_fx_1", 22), ("intensity_fx_1", 23), ("amount_fx_1", 25),
    ("time_fx_2", 26), ("intensity_fx_2", 27), ("amount_fx_2", 28),
    ("time_fx_3", 29), ("intensity_fx_3", 30), ("amount_fx_3", 31),
    ("gate", 115), ("spice", 116), ("macro_1", 117), ("macro_2", 118),
];

fn on(dependency: &str, options: &[&str]) -> Requirement {
    Requirement::selected(dependency, options)
}

fn advanced() -> Requirement {
    on("primary_tabs", &["Advanced"])
}

fn sequencer() -> Requirement {
    on("primary_tabs", &["Sequencer"])
}

fn settings(panel: &str) -> Requirement {
    on(panel, &["settings"])
}

/// Build the full MiniFreak V affordance table.
pub fn minifreak() -> Result<Registry, RegistryError> {
    let mut r = RegistryBuilder::new(REFERENCE);

    register_tabs(&mut r)?;
    register_advanced(&mut r)?;
    register_settings_panels(&mut r)?;
    register_routing(&mut r)?;
    register_sequencer(&mut r)?;
    register_midi(&mut r)?;

    r.finalize()
}

fn register_tabs(r: &mut RegistryBuilder) -> Result<(), RegistryError> {
    r.register(Declaration::select(
        "primary_tabs",
        &["Advanced", "Sequencer"],
        &[(1586, 102), (1716, 103)],
    ))?;

    let adv = Precondition::all([advanced()]);
    r.register(
        Declaration::select("fx_tabs", FX_SLOTS, &[(1598, 200), (1718, 197), (1840, 198)])
            .requires(adv.clone()),
    )?;
    r.register(
        Declaration::select("chord_scale_tabs", &["Chord", "Scale"], &[(83, 543), (243, 541)])
            .requires(adv.clone()),
    )?;
    for (panel, settings_at, controls_at) in [
        ("voices_panel", (524, 712), (523, 587)),
        ("cycenv_panel", (1427, 712), (1427, 585)),
        ("env_panel", (1882, 713), (1882, 586)),
        ("wheels_panel", (165, 948), (163, 1241)),
    ] {
        r.register(
            Declaration::select(panel, &["controls", "settings"], &[controls_at, settings_at])
                .requires(adv.clone()),
        )?;
    }
    r.register(
        Declaration::select(
            "secondary_tabs",
            &["Macro/Matrix", "LFO_Shaper"],
            &[(1103, 893), (1470, 897)],
        )
        .requires(adv.clone()),
    )?;
    r.register(
        Declaration::select("lfo_tabs", &["LFO_1", "LFO_2"], &[(410, 955), (549, 953)])
            .requires(Precondition::all([advanced(), on("secondary_tabs", &["LFO_Shaper"])])),
    )?;
    r.register(
        Declaration::select(
            "sequencer_arpeggiator_modes",
            &["Off", "Arp", "Seq"],
            &[(99, 265), (182, 260), (265, 261)],
        )
        .requires(Precondition::all([sequencer()])),
    )?;
    Ok(())
}

fn register_advanced(r: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let adv = Precondition::all([advanced()]);

    for (name, at) in [("fx1", (1556, 199)), ("fx2", (1677, 199)), ("fx3", (1799, 199))] {
        r.register(Declaration::toggle(name, at).requires(adv.clone()))?;
    }

    r.register(Declaration::dropdown("type_osc_1", OSC_1_TYPES, (476, 200)).requires(adv.clone()))?;
    let mut osc_2_types = OSC_1_TYPES.to_vec();
    osc_2_types.push("Paraphony");
    r.register(Declaration::dropdown("type_osc_2", &osc_2_types, (1005, 200)).requires(adv.clone()))?;
    r.register(Declaration::dropdown("type_filter", &["LP", "BP", "HP"], (1395, 198)).requires(adv.clone()))?;
    // One dropdown on screen, but which FX slot it edits depends on the FX tab.
    r.register_branches(
        Declaration::dropdown("type_fx", FX_TYPES, (1524, 241)).requires(adv.clone()),
        "fx_tabs",
        FX_SLOTS,
    )?;

    r.register(
        Declaration::dropdown("mode_voices", &["Mono", "Unison", "Poly", "Para"], (421, 711))
            .requires(adv.clone()),
    )?;
    r.register(
        Declaration::dropdown("mode_cycenv", &["Env", "Run", "Loop"], (1193, 712)).requires(adv.clone()),
    )?;

    let mut lfo1_retrigger = KBD_RETRIGGER.to_vec();
    lfo1_retrigger.extend(["Free", "One", "CycEnv", "Seq_Start"]);
    let mut lfo2_retrigger = lfo1_retrigger.clone();
    lfo1_retrigger.push("LFO2");
    lfo2_retrigger.push("LFO1");
    r.register(Declaration::dropdown("retrigger_lfo1", &lfo1_retrigger, (689, 711)).requires(adv.clone()))?;
    r.register(Declaration::dropdown("retrigger_lfo2", &lfo2_retrigger, (943, 712)).requires(adv.clone()))?;
    r.register(
        Declaration::dropdown("retrigger_env", &["Env_Reset", "Env_Continue"], (1606, 711))
            .requires(adv.clone()),
    )?;

    r.register(Declaration::cycle("rate_type_lfo1", LFO_RATE_TYPES, (771, 710)).requires(adv.clone()))?;
    r.register(Declaration::cycle("rate_type_lfo2", LFO_RATE_TYPES, (1034, 710)).requires(adv.clone()))?;

    r.register(Declaration::toggle("chord", (98, 773)).requires(adv.clone()))?;
    r.register(
        Declaration::dropdown(
            "chord_root",
            &["c", "c_sharp", "d", "d_sharp", "e", "f", "f_sharp", "g", "g_sharp", "a", "a_sharp", "b"],
            (168, 776),
        )
        .requires(adv.clone()),
    )?;
    r.register(
        Declaration::dropdown(
            "scale_mode",
            &["Global", "Major", "Minor", "Dorian", "Mixolydian", "Blues", "Pentatonic", "User"],
            (226, 771),
        )
        .requires(adv.clone()),
    )?;

    let chord_tab = Precondition::all([advanced(), on("chord_scale_tabs", &["Chord"])]);
    let scale_tab = Precondition::all([advanced(), on("chord_scale_tabs", &["Scale"])]);
    r.register(
        Declaration::select(
            "chord_octaves",
            &["-5", "-4", "-3", "-2", "-1", "0", "+1", "+2", "+3", "+4", "+5"],
            &[
                (60, 707), (82, 708), (101, 706), (124, 708), (142, 709), (162, 708),
                (183, 709), (204, 708), (223, 708), (245, 710), (266, 709),
            ],
        )
        .requires(chord_tab.clone()),
    )?;
    for &(note, chord_at, scale_at) in CHORD_NOTES {
        r.register(
            Declaration::toggle(&format!("{note}_chord_selection"), chord_at).requires(chord_tab.clone()),
        )?;
        r.register(
            Declaration::toggle(&format!("{note}_scale_selection"), scale_at).requires(scale_tab.clone()),
        )?;
    }

    let shaper = Precondition::all([advanced(), on("secondary_tabs", &["LFO_Shaper"])]);
    r.register(
        Declaration::select(
            "lfo_shapes",
            &["up", "down", "curve", "flat"],
            &[(401, 1162), (492, 1164), (398, 1204), (496, 1207)],
        )
        .requires(shaper.clone()),
    )?;
    r.register(
        Declaration::dropdown("rate_lfo_shaper", &["One_Step", "All_Steps"], (549, 1085))
            .requires(shaper.clone()),
    )?;
    r.register(Declaration::refresh("reset_lfo_shaper", (466, 999)).requires(shaper.clone()))?;
    r.register(Declaration::slider("grid_length_lfo_shaper", (556, 1042)).requires(shaper.clone()))?;
    r.register(Declaration::slider("amplitude_lfo_shaper", (563, 1191)).requires(shaper))?;

    let matrix = Precondition::all([advanced(), on("secondary_tabs", &["Macro/Matrix"])]);
    #[rustfmt::skip]
    let macro_amounts = [
        ("amount_1_macro_1", (549, 1032)), ("amount_2_macro_1", (551, 1089)),
        ("amount_3_macro_1", (552, 1151)), ("amount_4_macro_1", (552, 1210)),
        ("amount_1_macro_2", (843, 1031)), ("amount_2_macro_2", (841, 1090)),
        ("amount_3_macro_2", (842, 1153)), ("amount_4_macro_2", (842, 1211)),
    ];
    for (name, at) in macro_amounts {
        r.register(Declaration::slider(name, at).requires(matrix.clone()))?;
    }

    r.register(Declaration::slider("brightness", (1389, 1283)))?;
    r.register(Declaration::slider("timbre", (1524, 1285)))?;
    Ok(())
}

fn register_settings_panels(r: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let voices = || Precondition::all([advanced(), settings("voices_panel")]);
    let mono = on("mode_voices", &["Mono"]);
    let unison = on("mode_voices", &["Unison"]);
    let poly_para = on("mode_voices", &["Poly", "Para"]);

    r.register(Declaration::toggle("legato_settings_mono_voices", (510, 689)).requires(voices().and(mono.clone())))?;
    r.register(Declaration::toggle("legato_settings_uni_voices", (510, 636)).requires(voices().and(unison.clone())))?;
    r.register(
        Declaration::dropdown("glide_mode_settings_mono_voices", GLIDE_TYPES, (478, 639))
            .requires(voices().and(mono)),
    )?;
    r.register(
        Declaration::dropdown("glide_mode_settings_uni_voices", GLIDE_TYPES, (479, 616))
            .requires(voices().and(unison.clone())),
    )?;
    r.register(
        Declaration::dropdown("glide_mode_settings_poly_voices", GLIDE_TYPES, (481, 627))
            .requires(voices().and(poly_para.clone())),
    )?;
    r.register(
        Declaration::dropdown("uni_mode_settings_uni_voices", &["Unison", "Uni_Poly", "Uni_Para"], (478, 662))
            .requires(voices().and(unison.clone())),
    )?;
    r.register(Declaration::slider("uni_count_settings_uni_voices", (476, 688)).requires(voices().and(unison.clone())))?;
    r.register(Declaration::slider("uni_spread_settings_uni_voices", (479, 712)).requires(voices().and(unison)))?;
    r.register(
        Declaration::dropdown("allocation_settings_poly_voices", &["Cycle", "Reassign", "Reset"], (480, 664))
            .requires(voices().and(poly_para.clone())),
    )?;
    r.register(
        Declaration::dropdown("note_steal_settings_poly_voices", &["Oldest", "Lowest_Velo", "None"], (474, 700))
            .requires(voices().and(poly_para)),
    )?;

    let cycenv = || Precondition::all([advanced(), settings("cycenv_panel")]);
    let env_mode = on("mode_cycenv", &["Env"]);
    let run_mode = on("mode_cycenv", &["Run"]);
    let loop_mode = on("mode_cycenv", &["Loop"]);
    r.register(
        Declaration::dropdown("retrigger_settings_env_cycenv", KBD_RETRIGGER, (1351, 626))
            .requires(cycenv().and(env_mode.clone())),
    )?;
    r.register(
        Declaration::cycle("rise_curve_settings_env_cycenv", RISING_CURVES, (1350, 665))
            .requires(cycenv().and(env_mode.clone())),
    )?;
    r.register(
        Declaration::cycle("fall_curve_settings_env_cycenv", FALLING_CURVES, (1353, 701))
            .requires(cycenv().and(env_mode)),
    )?;
    r.register(
        Declaration::dropdown("stage_order_settings_run_cycenv", STAGE_ORDERS, (1350, 646))
            .requires(cycenv().and(run_mode.clone())),
    )?;
    r.register(
        Declaration::dropdown("stage_order_settings_loop_cycenv", STAGE_ORDERS, (1346, 659))
            .requires(cycenv().and(loop_mode.clone())),
    )?;
    r.register(Declaration::slider("rise_curve_settings_run_cycenv", (1349, 680)).requires(cycenv().and(run_mode.clone())))?;
    r.register(Declaration::slider("fall_curve_settings_run_cycenv", (1348, 707)).requires(cycenv().and(run_mode)))?;
    r.register(Declaration::slider("rise_curve_settings_loop_cycenv", (1347, 686)).requires(cycenv().and(loop_mode.clone())))?;
    r.register(Declaration::slider("fall_curve_settings_loop_cycenv", (1346, 715)).requires(cycenv().and(loop_mode)))?;
    // Tempo sync sits at the same spot in Run and Loop mode.
    r.register_branches(
        Declaration::toggle("tempo_sync_settings_cycenv", (1411, 615)).requires(cycenv()),
        "mode_cycenv",
        &["Run", "Loop"],
    )?;

    let env = || Precondition::all([advanced(), settings("env_panel")]);
    r.register(Declaration::dropdown("attack_curve_settings_envelope", ATTACK_CURVES, (1631, 619)).requires(env()))?;
    r.register(Declaration::dropdown("decay_curve_settings_envelope", FALLING_CURVES, (1625, 647)).requires(env()))?;
    r.register(Declaration::dropdown("release_curve_settings_envelope", FALLING_CURVES, (1626, 678)).requires(env()))?;
    for (name, y) in [
        ("vel_vca_settings_envelope", 620),
        ("vel_vcf_settings_envelope", 650),
        ("vel_env_settings_envelope", 677),
        ("vel_time_settings_envelope", 708),
    ] {
        r.register(Declaration::slider(name, (1836, y)).requires(env()))?;
    }

    let wheels = || Precondition::all([advanced(), settings("wheels_panel")]);
    r.register(Declaration::toggle("vibrato_settings_wheels", (239, 1005)).requires(wheels()))?;
    r.register(Declaration::slider("vibrato_rate_settings_wheels", (210, 1047)).requires(wheels()))?;
    r.register(Declaration::slider("vibrato_depth_settings_wheels", (209, 1091)).requires(wheels()))?;
    r.register(Declaration::slider("bend_range_settings_wheels", (209, 1134)).requires(wheels()))?;
    Ok(())
}

fn register_routing(r: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let advanced_slot = Precondition::all([advanced(), on("secondary_tabs", &["Macro/Matrix"])]);
    let sequencer_slot = Precondition::all([sequencer()]);

    let slots: Vec<&str> = ROUTING_SLOTS_ADVANCED
        .iter()
        .chain(ROUTING_SLOTS_SEQUENCER)
        .copied()
        .collect();
    let mut decl = Declaration::select("routing_slot", &slots, ROUTING_SLOT_ANCHORS)
        .requires(advanced_slot.clone());
    for slot in ROUTING_SLOTS_SEQUENCER {
        decl = decl.option_requires(slot, sequencer_slot.clone());
    }
    r.register(decl)?;

    // Destinations are picked after choosing a slot, on either primary tab.
    let assignable = Precondition::all([
        advanced(),
        on("secondary_tabs", &["Macro/Matrix"]),
        on("routing_slot", ROUTING_SLOTS_ADVANCED),
    ])
    .or([sequencer(), on("routing_slot", ROUTING_SLOTS_SEQUENCER)]);

    let names: Vec<&str> = ROUTING_ASSIGNMENTS.iter().map(|(n, _)| *n).collect();
    let anchors: Vec<(i32, i32)> = ROUTING_ASSIGNMENTS.iter().map(|(_, at)| *at).collect();
    let mut decl = Declaration::select("routing_assignments", &names, &anchors).requires(assignable.clone());
    for &name in &names {
        let extra = match name {
            "uni_spread" => Some(settings("voices_panel")),
            "vibrato_rate" => Some(settings("wheels_panel")),
            _ if name.ends_with("fx1") => Some(on("fx_tabs", &["FX_1"])),
            _ if name.ends_with("fx2") => Some(on("fx_tabs", &["FX_2"])),
            _ if name.ends_with("fx3") => Some(on("fx_tabs", &["FX_3"])),
            _ => None,
        };
        if let Some(extra) = extra {
            decl = decl.option_requires(name, assignable.clone().and(extra));
        }
    }
    r.register(decl)
}

fn register_sequencer(r: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let seq = Precondition::all([sequencer()]);
    let arp = Precondition::all([sequencer(), on("sequencer_arpeggiator_modes", &["Arp"])]);
    let seq_mode = Precondition::all([sequencer(), on("sequencer_arpeggiator_modes", &["Seq"])]);

    r.register(
        Declaration::select(
            "arpeggiator_progression_modes",
            &["Up", "Down", "Up/Down", "Random", "Order", "Poly", "Walk", "Pattern"],
            &[(401, 259), (472, 262), (544, 261), (619, 262), (688, 262), (759, 266), (831, 262), (906, 264)],
        )
        .requires(arp.clone()),
    )?;
    r.register(
        Declaration::select(
            "arpeggiator_octave_modes",
            &["Oct1", "Oct2", "Oct3", "Oct4"],
            &[(976, 263), (1044, 261), (1114, 263), (1188, 263)],
        )
        .requires(arp.clone()),
    )?;
    r.register(
        Declaration::select(
            "scroll_positions",
            &["highest", "higher", "lower", "lowest"],
            &[(1879, 923), (1880, 737), (1880, 605), (1880, 472)],
        )
        .requires(seq.clone()),
    )?;
    r.register(
        Declaration::select(
            "n_bars",
            &["1_Bar", "2_Bar", "3_Bar", "4_Bar"],
            &[(1051, 276), (1148, 259), (1231, 263), (1315, 264)],
        )
        .requires(seq.clone()),
    )?;

    r.register(Declaration::toggle("rand_oct_arp", (1399, 266)).requires(arp.clone()))?;
    for (row, at) in [(1, (87, 1043)), (2, (88, 1097)), (3, (89, 1149)), (4, (88, 1203))] {
        r.register(Declaration::toggle(&format!("row_{row}_auto_smooth_seq"), at).requires(seq.clone()))?;
    }
    for (name, at) in [
        ("autoplay_seq", (637, 264)),
        ("overdub_seq", (723, 263)),
        ("pause_play_seq", (808, 259)),
        ("record_seq", (894, 262)),
    ] {
        r.register(Declaration::toggle(name, at).requires(seq_mode.clone()))?;
    }
    for (name, at) in [
        ("repeat_arp_seq", (1257, 260)),
        ("ratchet_arp_seq", (1322, 261)),
        ("mutate_arp_seq", (1474, 261)),
    ] {
        r.register(Declaration::hold_toggle(name, at).requires(arp.clone()))?;
    }
    for (name, at) in [
        ("roll_dice_seq", (1695, 260)),
        ("incr_time_div_seq", (1830, 240)),
        ("decr_time_div_seq", (1828, 296)),
    ] {
        r.register(Declaration::refresh(name, at).requires(seq.clone()))?;
    }
    for (name, at) in [
        ("swing_seq", (1782, 266)),
        ("tempo_seq", (1840, 192)),
        ("gate_seq", (1588, 263)),
        ("spice_seq", (1641, 262)),
    ] {
        r.register(Declaration::slider(name, at).requires(seq.clone()))?;
    }
    Ok(())
}

fn register_midi(r: &mut RegistryBuilder) -> Result<(), RegistryError> {
    for &(name, controller) in MIDI_SLIDERS {
        r.register(Declaration::midi_slider(name, controller))?;
    }
    r.register(Declaration::midi_toggle(SUSTAIN, 64))?;
    r.register(Declaration::midi_note(NOTE, 60, 100))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affordance::{Kind, State};
    use crate::controller::{Controller, Outcome};
    use crate::input::{Action, Key, Recorder};
    use crate::midi::{MidiEvent, MidiTransport};

    struct NoMidi;

    impl MidiTransport for NoMidi {
        fn send(&mut self, _: &MidiEvent) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn controller() -> Controller<Recorder, NoMidi> {
        Controller::new(minifreak().unwrap(), Recorder::new(REFERENCE), NoMidi)
    }

    #[test]
    fn table_builds_and_starts_valid() {
        let registry = minifreak().unwrap();
        assert!(registry.len() > 140, "only {} affordances", registry.len());
        for a in registry.iter() {
            assert!(a.is_valid(a.initial()), "{}", a.name());
        }
    }

    #[test]
    fn every_kind_is_represented() {
        let registry = minifreak().unwrap();
        for kind in Kind::ALL {
            assert!(registry.iter().any(|a| a.kind() == kind), "no {kind}");
        }
    }

    #[test]
    fn fx_type_is_expanded_per_slot() {
        let registry = minifreak().unwrap();
        for slot in ["fx_1", "fx_2", "fx_3"] {
            let a = registry.get(&format!("type_fx_{slot}")).unwrap();
            assert_eq!(a.kind(), Kind::Dropdown);
            assert_eq!(a.options().len(), FX_TYPES.len());
        }
    }

    #[test]
    fn rate_type_lfo1_goes_backward_to_triplet() {
        let mut c = controller();
        let out = c.perform("rate_type_lfo1", &State::selected("Triplet")).unwrap();
        assert_eq!(out, Outcome::Applied(2));
        assert_eq!(c.state("rate_type_lfo1"), Some(&State::selected("Triplet")));
    }

    #[test]
    fn fx1_unreachable_from_sequencer_tab() {
        let mut c = controller();
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        assert_eq!(c.perform("fx1", &State::On).unwrap(), Outcome::Unreachable);
        assert_eq!(c.state("fx1"), Some(&State::Off));
    }

    #[test]
    fn harmo_needs_three_downs() {
        let mut c = controller();
        c.perform("type_osc_1", &State::selected("Harmo")).unwrap();
        let actions = c.input_mut().take();
        assert_eq!(actions.iter().filter(|a| **a == Action::Press(Key::Down)).count(), 3);
        assert_eq!(actions.last(), Some(&Action::Press(Key::Enter)));
        assert_eq!(actions.len(), 5);
    }

    #[test]
    fn unison_settings_need_the_whole_path() {
        let mut c = controller();
        let target = State::selected("Uni_Poly");
        assert_eq!(
            c.perform("uni_mode_settings_uni_voices", &target).unwrap(),
            Outcome::Unreachable
        );
        c.perform("voices_panel", &State::selected("settings")).unwrap();
        assert_eq!(
            c.perform("uni_mode_settings_uni_voices", &target).unwrap(),
            Outcome::Unreachable
        );
        c.perform("mode_voices", &State::selected("Unison")).unwrap();
        assert_eq!(
            c.perform("uni_mode_settings_uni_voices", &target).unwrap(),
            Outcome::Applied(4)
        );
    }

    #[test]
    fn fx_routing_needs_matching_fx_tab() {
        let mut c = controller();
        let target = State::selected("intensity_fx2");
        assert!(!c.interactable("routing_assignments", &target).unwrap());
        c.perform("fx_tabs", &State::selected("FX_2")).unwrap();
        assert!(c.interactable("routing_assignments", &target).unwrap());
        assert!(!c
            .interactable("routing_assignments", &State::selected("intensity_fx1"))
            .unwrap());
        assert!(c
            .interactable("routing_assignments", &State::selected("cutoff_filter"))
            .unwrap());
    }

    #[test]
    fn routing_from_sequencer_needs_sequencer_slot() {
        let mut c = controller();
        c.perform("primary_tabs", &State::selected("Sequencer")).unwrap();
        let target = State::selected("cutoff_filter");
        assert!(!c.interactable("routing_assignments", &target).unwrap());
        c.perform("routing_slot", &State::selected("mod_src_2")).unwrap();
        assert!(c.interactable("routing_assignments", &target).unwrap());
    }
}
