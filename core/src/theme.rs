use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Placeholder replaced by a direction or quadrant in clue templates.
pub const DIRECTION_SLOT: &str = "{direction}";

/// Text shown for misses, either one pool or three pools picked by attempts used so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPool {
    Flat(Vec<String>),
    Tiered {
        early: Vec<String>,
        mid: Vec<String>,
        late: Vec<String>,
        #[serde(default = "default_early_until")]
        early_until: CellCount,
        #[serde(default = "default_mid_until")]
        mid_until: CellCount,
    },
}

fn default_early_until() -> CellCount {
    10
}

fn default_mid_until() -> CellCount {
    20
}

impl MissPool {
    /// The pool to draw from once `attempts` reveals have been spent.
    pub fn for_attempts(&self, attempts: CellCount) -> &[String] {
        match self {
            Self::Flat(pool) => pool,
            Self::Tiered {
                early,
                mid,
                late,
                early_until,
                mid_until,
            } => {
                if attempts <= *early_until {
                    early
                } else if attempts <= *mid_until {
                    mid
                } else {
                    late
                }
            }
        }
    }
}

/// How proximity clues describe where a shape lies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bearing {
    #[default]
    Compass,
    Quadrant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityTemplate {
    pub label: String,
    pub template: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingText {
    pub victory_title: String,
    pub victory_text: String,
    pub defeat_title: String,
    pub defeat_text: String,
}

/// Every piece of narrative a puzzle needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub miss: MissPool,
    pub partial_hit: Vec<String>,
    pub completion: Vec<String>,
    #[serde(default)]
    pub proximity: Vec<ProximityTemplate>,
    #[serde(default = "default_proximity_fallback")]
    pub proximity_fallback: String,
    #[serde(default)]
    pub proximity_bearing: Bearing,
    #[serde(default)]
    pub periodic: Vec<String>,
    #[serde(default)]
    pub endings: EndingText,
}

fn default_proximity_fallback() -> String {
    "Unusual activity detected in a {direction} district.".into()
}

impl Theme {
    /// Template for shapes labelled `label`, falling back to the generic one.
    pub fn proximity_template(&self, label: &str) -> &str {
        self.proximity
            .iter()
            .find(|entry| entry.label == label)
            .map_or(self.proximity_fallback.as_str(), |entry| entry.template.as_str())
    }

    pub fn render(template: &str, direction: &str) -> String {
        template.replace(DIRECTION_SLOT, direction)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn templates(items: &[(&str, &str)]) -> Vec<ProximityTemplate> {
    items
        .iter()
        .map(|&(label, template)| ProximityTemplate {
            label: label.into(),
            template: template.into(),
        })
        .collect()
}

impl Theme {
    /// Chicago, 1893: a hidden trap door in H. H. Holmes' hotel.
    pub fn murder_castle() -> Self {
        Self {
            miss: MissPool::Tiered {
                early: strings(&[
                    "The floorboards groan but hold firm.",
                    "Only dust and the smell of old varnish.",
                    "A hollow echo... no, just the joists.",
                    "Your knuckles meet solid oak.",
                    "Somewhere below, a furnace rumbles.",
                ]),
                mid: strings(&[
                    "Footsteps pass in the hallway. Keep quiet.",
                    "The gaslight flickers. Solid floor here.",
                    "A loose nail, nothing more.",
                    "Scratches on the boards, but nothing beneath.",
                    "The castle walls seem to lean closer.",
                ]),
                late: strings(&[
                    "Holmes' voice drifts up the stairwell.",
                    "A door slams somewhere on the second floor.",
                    "Your hands are shaking. Nothing here.",
                    "Keys jingle in the corridor. Hurry.",
                    "Time is running out. The floor is solid.",
                ]),
                early_until: default_early_until(),
                mid_until: default_mid_until(),
            },
            partial_hit: strings(&[
                "A hollow knock! Something is beneath this board.",
                "The board shifts under your hand.",
                "Cold air seeps up through the cracks.",
                "You hear the creak of a hinge below.",
            ]),
            completion: strings(&[
                "The trap door swings open into the darkness!",
                "You pry the hatch loose. The night air rushes in.",
                "The hidden door gives way. Freedom lies below.",
            ]),
            proximity: Vec::new(),
            proximity_fallback: default_proximity_fallback(),
            proximity_bearing: Bearing::Compass,
            periodic: Vec::new(),
            endings: EndingText {
                victory_title: "Escaped the Murder Castle!".into(),
                victory_text: "You outwitted Holmes and escaped through his trap door into the Chicago night.".into(),
                defeat_title: "Trapped Forever".into(),
                defeat_text: "Holmes' footsteps echo in the hallway. You've become another victim of the Murder Castle.".into(),
            },
        }
    }

    /// The 47th floor of an abandoned smart building.
    pub fn smart_building() -> Self {
        Self {
            miss: MissPool::Flat(strings(&[
                "Panel status: NOMINAL. No anomaly detected.",
                "The LED pulses green and fades.",
                "Pressure sensor reports standard load.",
                "Static hisses from the building intercom.",
                "Diagnostic sweep clean. Keep searching.",
                "The emergency lighting flickers overhead.",
            ])),
            partial_hit: strings(&[
                "Panel status: ACCESS SEQUENCE PARTIAL.",
                "The panel hums and locks in place. Part of the hatch!",
                "Amber indicator lit: maintenance circuit detected.",
            ]),
            completion: strings(&[
                "Access sequence complete. The maintenance hatch unlocks.",
                "The floor panels retract, revealing the escape route.",
            ]),
            proximity: Vec::new(),
            proximity_fallback: default_proximity_fallback(),
            proximity_bearing: Bearing::Compass,
            periodic: Vec::new(),
            endings: EndingText {
                victory_title: "Hatch Unlocked".into(),
                victory_text: "The maintenance shaft opens beneath you. The missing technologists left this way.".into(),
                defeat_title: "Signal Lost".into(),
                defeat_text: "The panels go dark one by one. Whatever took the others is coming for you.".into(),
            },
        }
    }

    /// Undercover detectives sweeping the city for a criminal network.
    pub fn shadow_network() -> Self {
        Self {
            miss: MissPool::Flat(strings(&[
                "Dead end. The address is clean.",
                "Nothing but tourists and pigeons.",
                "Surveillance came back empty.",
                "Your contact never showed.",
                "A false lead. Regroup and sweep again.",
            ])),
            partial_hit: strings(&[
                "Suspicious activity confirmed at this location!",
                "Your team found evidence. The operation is close.",
                "A raid uncovers part of the network.",
            ]),
            completion: strings(&[
                "Operation busted! The crew is in custody.",
                "Raid successful. Another operation shut down.",
            ]),
            proximity: templates(&[
                ("Drug Lab", "Informant reports chemical odors in the {direction} part of the city."),
                ("Weapons Cache", "Unusual late-night traffic reported in a {direction} neighborhood."),
                ("Money Laundering Front", "Suspicious financial activity detected in the {direction} sector."),
                ("Server Farm", "High energy consumption detected in a building to the {direction}."),
                ("Data Center", "Unusual data traffic patterns originating from the {direction} vicinity."),
                ("Front Company", "Shell corporations with unusual transactions are operating in the {direction} area."),
                ("Forgery Studio", "Reports of unusual art supplies deliveries in the {direction} vicinity."),
                ("Auction House", "High-value art pieces are being moved discreetly in the {direction} area."),
                ("Storage Facility", "Large, unmarked shipments have been observed in a facility to the {direction}."),
                ("Shipping Container", "Unusual activity around shipping containers in the {direction} port district."),
                ("Warehouse Lab", "Strange fumes and unusual activity reported from a warehouse in the {direction}."),
                ("Safe House", "Known associates have been spotted frequenting a residence in the {direction} neighborhood."),
            ]),
            proximity_fallback: default_proximity_fallback(),
            proximity_bearing: Bearing::Compass,
            periodic: strings(&[
                "Informant tip: Increased activity reported in the {direction}.",
                "Surveillance report: Unusual patterns observed in the {direction}.",
                "Communication intercept: A significant operation is active in the {direction}.",
                "Banking intelligence: Suspicious transactions linked to the {direction}.",
            ]),
            endings: EndingText {
                victory_title: "Network Dismantled".into(),
                victory_text: "Every operation has been busted. The city sleeps a little easier tonight.".into(),
                defeat_title: "The Trail Went Cold".into(),
                defeat_text: "Your sweeps are spent and the network has gone to ground.".into(),
            },
        }
    }
}

/// A detective case: the operations hidden in the city for one shadow network game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub title: String,
    pub narrative: String,
    pub instructions: String,
    pub operations: Vec<ShapeRequest>,
}

fn operations(items: &[(&str, CellCount)]) -> Vec<ShapeRequest> {
    items
        .iter()
        .map(|&(label, size)| ShapeRequest {
            label: label.into(),
            size,
        })
        .collect()
}

impl Case {
    pub fn all() -> Vec<Self> {
        let instructions = "Sweep city blocks to uncover the hidden operations. Every sweep costs time; \
                            intelligence reports will point you towards anything nearby.";
        Vec::from([
            Self {
                id: "cartel-connection".into(),
                title: "The Cartel Connection".into(),
                narrative: "A new supplier has flooded the docks with product.\n\n\
                            Follow the money and shut down every link in the chain."
                    .into(),
                instructions: instructions.into(),
                operations: operations(&[
                    ("Drug Lab", 3),
                    ("Weapons Cache", 2),
                    ("Money Laundering Front", 4),
                    ("Safe House", 2),
                ]),
            },
            Self {
                id: "digital-underground".into(),
                title: "The Digital Underground".into(),
                narrative: "Stolen identities are being sold by the thousand.\n\n\
                            Somewhere in the city, the servers never sleep."
                    .into(),
                instructions: instructions.into(),
                operations: operations(&[("Server Farm", 3), ("Data Center", 4), ("Front Company", 2)]),
            },
            Self {
                id: "art-of-deception".into(),
                title: "The Art of Deception".into(),
                narrative: "Three museums report the same masterpiece as their own.\n\n\
                            Find who paints them, who sells them, and where they are kept."
                    .into(),
                instructions: instructions.into(),
                operations: operations(&[
                    ("Forgery Studio", 3),
                    ("Auction House", 2),
                    ("Storage Facility", 3),
                ]),
            },
            Self {
                id: "harbor-lights".into(),
                title: "Harbor Lights".into(),
                narrative: "Containers arrive at night and leave lighter by morning.\n\n\
                            The harbor is hiding more than cargo."
                    .into(),
                instructions: instructions.into(),
                operations: operations(&[
                    ("Shipping Container", 4),
                    ("Warehouse Lab", 3),
                    ("Safe House", 2),
                ]),
            },
        ])
    }

    pub fn find(id: &str) -> Option<Self> {
        Self::all().into_iter().find(|case| case.id == id)
    }
}

impl PuzzleConfig {
    /// Historical thriller: a single 2x2 trap door and 30 knocks to find it.
    pub fn murder_castle() -> Self {
        Self {
            id: "murder-castle".into(),
            title: "Escape the Murder Castle".into(),
            grid_size: GRID_SIZE,
            layout: LayoutConfig::Square {
                label: "Trap Door".into(),
                size: 4,
            },
            budget: BudgetConfig::Capped { cap: 30 },
            timing: TimingConfig {
                finish_delay_ms: Some(3000),
                ..TimingConfig::default()
            },
            host: None,
            probe_cue: true,
            autosave: false,
            clue_retention: None,
            theme: Theme::murder_castle(),
        }
    }

    /// Sci-fi investigation: a single 2x2 escape hatch paid for with the host's sanity.
    pub fn smart_building() -> Self {
        let host = HostConfig {
            embedded: true,
            ..HostConfig::default()
        };
        Self {
            id: "transamerica-investigation".into(),
            title: "Find the Escape Hatch".into(),
            grid_size: GRID_SIZE,
            layout: LayoutConfig::Square {
                label: "Escape Hatch".into(),
                size: 4,
            },
            budget: BudgetConfig::Pool {
                initial: host.default_sanity,
            },
            timing: TimingConfig {
                finish_delay_ms: Some(3000),
                ..TimingConfig::default()
            },
            host: Some(host),
            probe_cue: true,
            autosave: false,
            clue_retention: None,
            theme: Theme::smart_building(),
        }
    }

    /// Detective heist: bust every operation of `case` within 30 sweeps.
    pub fn shadow_network(case: &Case) -> Self {
        Self {
            id: case.id.clone(),
            title: case.title.clone(),
            grid_size: GRID_SIZE,
            layout: LayoutConfig::Lines(case.operations.clone()),
            budget: BudgetConfig::Capped { cap: 30 },
            timing: TimingConfig {
                periodic_clue_ms: Some(10_000),
                ..TimingConfig::default()
            },
            host: None,
            probe_cue: false,
            autosave: true,
            clue_retention: None,
            theme: Theme::shadow_network(),
        }
    }
}
