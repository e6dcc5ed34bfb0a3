//! Built-in practice tracks and their scenarios.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackId {
    Ra,
    Ta,
}

impl TrackId {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackId::Ra => "ra",
            TrackId::Ta => "ta",
        }
    }

    /// Who the persona is on this track, as used in role-play prompts.
    pub fn persona_noun(self) -> &'static str {
        match self {
            TrackId::Ra => "college resident",
            TrackId::Ta => "student in a university course",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: &'static str,
    pub track_id: TrackId,
    pub title: &'static str,
    pub short_description: &'static str,
    pub opening_line: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub id: TrackId,
    pub name: &'static str,
    pub description: &'static str,
    pub scenarios: &'static [Scenario],
}

const fn ra(
    id: &'static str,
    title: &'static str,
    short_description: &'static str,
    opening_line: &'static str,
) -> Scenario {
    Scenario {
        id,
        track_id: TrackId::Ra,
        title,
        short_description,
        opening_line,
    }
}

const fn ta(
    id: &'static str,
    title: &'static str,
    short_description: &'static str,
    opening_line: &'static str,
) -> Scenario {
    Scenario {
        id,
        track_id: TrackId::Ta,
        title,
        short_description,
        opening_line,
    }
}

static RA_SCENARIOS: [Scenario; 11] = [
    ra(
        "ra-noise-complaint",
        "Noise Complaint on a Weeknight",
        "A resident is frustrated about loud neighbors and not being able to sleep.",
        "Hi, I'm really at my limit with the noise on my floor. I've got an exam tomorrow and I haven't slept.",
    ),
    ra(
        "ra-homesick",
        "Homesick First-Year",
        "A first-year student is feeling lonely, overwhelmed, and misses home a lot.",
        "It's only been a few weeks and I already feel overwhelmed and homesick. I'm not sure I belong here.",
    ),
    ra(
        "ra-roommate-conflict",
        "Roommate Conflict over Guests",
        "One roommate keeps inviting friends over late, leaving the other feeling disrespected in their own space.",
        "I've talked to them about the late-night guests so many times, but nothing changes and I'm ready to move out.",
    ),
    ra(
        "ra-guest-policy-violation",
        "Repeated Guest Policy Violation",
        "A resident was written up twice for bypassing the check-in desk and is upset about the consequences.",
        "Security acted like I'm a criminal just because my friend forgot their ID again, and now I'm on probation?",
    ),
    ra(
        "ra-cleanliness-dispute",
        "Shared Kitchen Cleanliness Dispute",
        "Neighbors are escalating arguments about dirty dishes, bugs, and ignored cleaning rotations.",
        "The sink is full of crusty dishes again and I'm done being the only one who cares if bugs take over our suite.",
    ),
    ra(
        "ra-wellness-check-in",
        "Wellness Check After Concerning Post",
        "Friends reported a resident's alarming social post, and you need to talk with them about safety without losing trust.",
        "I know people are worried, but I don't need the school involved every time I vent online. I'm fine.",
    ),
    ra(
        "ra-party-incident-followup",
        "Aftermath of a Shut-Down Party",
        "Residents are angry about how last weekend's party was handled and feel targeted by housing staff.",
        "You could have just warned us, but instead my whole floor thinks I snitched and now everyone is mad at me.",
    ),
    ra(
        "ra-maintenance-delay",
        "Maintenance Delay Frustration",
        "A resident with asthma has been waiting weeks for ventilation repairs and is escalating the issue.",
        "Facilities keeps saying they'll come soon, but I've been coughing all week. What am I supposed to do?",
    ),
    ra(
        "ra-cultural-tension",
        "Cultural Tension on the Floor",
        "Two residents feel stereotyped and excluded after insensitive jokes were made in the lounge.",
        "People say the comments are just jokes, but it's exhausting feeling like I'm the punchline every time we hang out.",
    ),
    ra(
        "ra-fire-alarm-fatigue",
        "Fire Alarm Fatigue",
        "Students are irritated after multiple late-night fire drills triggered by burnt popcorn and pranks.",
        "Three alarms in two weeks? I have labs at 8 a.m. and I'm done losing sleep because someone can't use a microwave.",
    ),
    ra(
        "ra-food-allergy-concern",
        "Food Allergy Concern in Shared Space",
        "A resident with a severe allergy wants new safeguards after repeated cross-contamination scares.",
        "I've asked everyone to label ingredients, but people still leave nut butter everywhere and it isn't safe for me.",
    ),
];

static TA_SCENARIOS: [Scenario; 10] = [
    ta(
        "ta-failed-midterm",
        "Student Upset About Failed Midterm",
        "A student is discouraged after doing poorly on a midterm exam.",
        "Hi, I just saw my midterm grade on Canvas and I honestly don't know how I'm supposed to pass this class now.",
    ),
    ta(
        "ta-extension-request",
        "Last-Minute Extension Request",
        "A student is asking for an extension very close to the deadline.",
        "I know the assignment is due tonight, but a lot of stuff came up this week. Is there any way I could get an extension?",
    ),
    ta(
        "ta-regrade-pushback",
        "Persistent Regrade Pushback",
        "A student insists their short-answer responses deserve full credit and emails daily until you meet with them.",
        "I compared my answer to the solution set and it matches, so why did the grader take points off?",
    ),
    ta(
        "ta-group-project-conflict",
        "Group Project Conflict",
        "Team members accuse one another of slacking and want you to fix grading fairness.",
        "We're doing all the work while he ghosts meetings, and it's not fair that he'll get the same grade.",
    ),
    ta(
        "ta-office-hours-overload",
        "Office Hours Overload",
        "A frustrated student feels rushed through office hours and wants more one-on-one help before the exam.",
        "Every time I show up there is a huge line and I get five minutes. How am I supposed to actually learn the material?",
    ),
    ta(
        "ta-academic-integrity-flag",
        "Academic Integrity Warning",
        "You must address suspiciously similar lab reports without accusing a student unfairly.",
        "My lab partner and I studied together, sure, but we didn't copy anything. Why am I being singled out?",
    ),
    ta(
        "ta-late-add-catchup",
        "Late Add Trying to Catch Up",
        "A student who joined mid-semester is overwhelmed and needs a plan to get on track.",
        "I just got off the waitlist and I'm already three assignments behind. Where do I even start?",
    ),
    ta(
        "ta-lab-feedback",
        "Harsh Lab Feedback Concern",
        "A student felt embarrassed by public critique during lab and wants reassurance it will not happen again.",
        "When you pointed out my mistake in front of everyone I just wanted to disappear. Can we talk about that?",
    ),
    ta(
        "ta-accessibility-accommodations",
        "Accessibility Accommodation Follow-Up",
        "A student with registered accommodations feels the course structure still leaves them behind.",
        "My letter says I get extra time, but the in-class quizzes happen so fast that I still can't finish.",
    ),
    ta(
        "ta-language-barrier-support",
        "Language Barrier Support",
        "An international student struggles to understand idioms used in lectures and wants inclusive resources.",
        "I study the textbook constantly, but in discussion I miss half the examples and fall behind.",
    ),
];

static TRACKS: [Track; 2] = [
    Track {
        id: TrackId::Ra,
        name: "RA track",
        description: "Practice challenging conversations that resident assistants commonly face.",
        scenarios: &RA_SCENARIOS,
    },
    Track {
        id: TrackId::Ta,
        name: "TA track",
        description: "Practice conversations around grades, extensions, and academic support.",
        scenarios: &TA_SCENARIOS,
    },
];

pub fn tracks() -> &'static [Track] {
    &TRACKS
}

pub fn get_track(id: TrackId) -> Option<&'static Track> {
    TRACKS.iter().find(|t| t.id == id)
}

pub fn all_scenarios() -> impl Iterator<Item = &'static Scenario> {
    TRACKS.iter().flat_map(|t| t.scenarios.iter())
}

pub fn get_scenario(id: &str) -> Option<&'static Scenario> {
    all_scenarios().find(|s| s.id == id)
}
