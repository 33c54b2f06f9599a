//! Built-in questionnaires.
//!
//! Each preset keeps the cutoffs of the form it comes from; the tables are
//! not reconciled with each other.

use super::config::{AnswerOption, ExclusivePair, Question, Questionnaire, SeverityTag};
use super::tiers::three_tier_table;

pub const SELF_RELEASE: &str = "self-release";
pub const SIZE_REACH: &str = "size-reach";
pub const SIZE_REACH_CLASSIC: &str = "size-reach-classic";

const RECOMMENDATION_HIGH: &str = "\
Empfehlungen bei ROT:
- Verzicht auf Betreten / Sperrung des betroffenen Geländes.
- Aktive Gefahrenreduktion: z. B. Lawinensprengung, Absprengen von Wechten.
- Umgehung oder Wahl sicherer Routen (z. B. Wald, Rücken, andere Talseite).
- Informationsweitergabe an Behörden, Rettungskräfte, Betreiber, Kommandant.
- Einsatz von Drohnen zur Fernbeobachtung.
- Notfallpläne aktivieren, z. B. Evakuierung von Straßen / Objekten.
- Temporäre Sperre: z. B. bis nach Setzung/Temperaturrückgang.";

const RECOMMENDATION_MODERATE: &str = "\
Empfehlungen bei GELB:
- Grenzwerte setzen!
- Ausreichend Abstand zum Hang halten (Ø-Gefälle Anriss-Standpunkt mind. ~ 26–27°).
- Zeitorientierte Planung: Tourenstart sehr früh, Rückkehr vor Erwärmung.
- Laufende Beobachtung: Schneedeckenveränderung, Setzungsgrad, Gleitschneerisse.
- SSD und vSSD (systematische / vereinfachte Schneedeckendiagnose).
- Staffelung von Gruppen – nie mehrere Personen im Hang.
- Nach Möglichkeit kritische Passage sichern oder umgehen.";

const RECOMMENDATION_LOW: &str = "\
Empfehlungen bei GRÜN:
- Standardmäßige Vorsicht nicht aufgeben (v. a. bei Einzelrisiken).
- Trotzdem laufend beobachten: Temperaturanstieg, Sonnenhang etc.
- Keine falsche Sicherheit vermitteln – andere Faktoren (z. B. Gleitschnee) beachten.
- Ggf. mit anderen Werkzeugen kombinieren (z. B. LLB, Systematische Schneedeckendiagnose).";

const RECOMMENDATIONS: [&str; 3] = [RECOMMENDATION_LOW, RECOMMENDATION_MODERATE, RECOMMENDATION_HIGH];

/// All built-in questionnaires
pub fn builtin() -> Vec<Questionnaire> {
    vec![self_release(), size_reach(), size_reach_classic()]
}

fn tagged(name: &str, options: [(&str, f64); 3]) -> Question {
    let tags = SeverityTag::ALL;
    Question::new(
        name,
        options
            .iter()
            .zip(tags)
            .map(|((label, score), tag)| AnswerOption::tagged(*label, tag, *score))
            .collect(),
    )
}

fn weighted(name: &str, weight: f64, options: [(&str, f64); 4]) -> Question {
    Question::new(
        name,
        options
            .iter()
            .map(|(label, score)| AnswerOption::new(*label, *score))
            .collect(),
    )
    .with_weight(weight)
}

/// Likelihood of a spontaneous new-snow release.
///
/// Options are listed high concern first (tag 1, 2, 3). At least three answers
/// must share a tag before an index is produced.
pub fn self_release() -> Questionnaire {
    Questionnaire {
        name: SELF_RELEASE.to_string(),
        title: Some("Selbstauslösung von Neuschnee-Lawinen".to_string()),
        description: Some("Kann sich eine Lawine lösen? Bewertung nach Ampelsystem.".to_string()),
        questions: vec![
            tagged(
                "Neuschneemenge (24h)",
                [("> 40 cm / Tag", 4.0), ("20–40 cm / Tag", 2.5), ("< 20 cm / Tag", 2.0)],
            ),
            tagged(
                "Regenmenge",
                [("starker Regen (> 5 mm)", 4.0), ("leichter Regen (< 5 mm)", 2.5), ("kein Regen", 3.0)],
            ),
            tagged(
                "Erwärmung",
                [("> 4 °C Erwärmung", 3.5), ("bis 4 °C Erwärmung", 2.0), ("kalt oder keine Erwärmung", 3.0)],
            ),
            tagged(
                "Schneedecken-Stabilität",
                [
                    ("Altschnee mitgerissen", 4.0),
                    ("nicht tragfähiger Harschdeckel", 2.5),
                    ("tragfähiger Harschdeckel oder keine Schwachschicht", 1.0),
                ],
            ),
            tagged(
                "Verbindung zur Altschneedecke",
                [
                    ("schlecht (kaltes Einschneien)", 3.0),
                    ("Beginn bei 0–2 °C", 2.0),
                    ("gut (Regen, dann Temperaturabfall)", 1.0),
                ],
            ),
            tagged(
                "Wind/Verfrachtung",
                [("starker Wind (> 40 km/h)", 3.0), ("mäßiger Wind (< 40 km/h)", 2.0), ("kein/wenig Wind", 1.0)],
            ),
            tagged(
                "Exposition/Sonneneinstrahlung",
                [
                    ("starke Sonneneinstrahlung", 3.5),
                    ("mäßige Sonneneinstrahlung", 2.5),
                    ("kaum oder keine Sonneneinstrahlung", 2.0),
                ],
            ),
            tagged(
                "SSD (vSSD)",
                [
                    ("schlechte Struktur (große Kristalle, weiche Schicht, dünn)", 4.0),
                    ("teils kritische Schwachschichten", 2.5),
                    ("stabile Struktur (kleine Kristalle, fest, dick)", 2.0),
                ],
            ),
            tagged(
                "Hangneigung / Exposition",
                [
                    ("> 35° und ungünstige Exposition", 4.0),
                    ("30–35° oder teils ungünstig", 2.0),
                    ("< 30° oder günstige Exposition", 1.0),
                ],
            ),
        ],
        thresholds: three_tier_table(
            2.2,
            3.3,
            [
                "Geringe Lawinengefahr",
                "Moderate Lawinengefahr – erhöhte Vorsicht erforderlich",
                "Hohe Lawinengefahr – besondere Vorsicht notwendig",
            ],
            ["#4CAF50", "#ffa500", "#ff4b4b"],
            RECOMMENDATIONS,
        ),
        min_same_tag: Some(3),
        exclusive: None,
        required: vec![],
        settlement: true,
    }
}

const IMPACT: &str = "Potenzielle Auswirkungen – Massenbewegung";
const PROXIMITY: &str = "Potenzielle Erreichbarkeit von Skipisten oder Infrastruktur";

/// Avalanche size and runout.
///
/// Questions 1-5 are required; of the last two exactly one is answered.
pub fn size_reach() -> Questionnaire {
    let questions = vec![
        weighted(
            "Größe des Geländes",
            1.5,
            [
                ("Sehr klein (z. B. schmaler Hangabschnitt – wenig Masse)", 1.0),
                ("Klein bis mittelgroß (einzelne Hänge oder kurze Rinnen)", 2.5),
                ("Groß (mehrere zusammenhängende Hangbereiche)", 4.5),
                ("Sehr groß (ausgedehntes Kar oder verbundenes Gelände)", 7.0),
            ],
        ),
        weighted(
            "Schneemenge und Stabilität",
            2.0,
            [
                ("Wenig Schnee, stabil (kaum Lawinenpotenzial)", 1.0),
                ("Mittlere Schneemenge, eher stabil (lokale Auslösungen möglich)", 4.0),
                ("Viel Schnee, mit Schwachschichten (erhöhtes Gefahrenpotenzial)", 5.0),
                (
                    "Sehr viel Schnee, instabil – hohe verfügbare Masse (z. B. Triebschnee, Nass-/Gleitschnee, großes Schwimmschneefundament)",
                    8.0,
                ),
            ],
        ),
        weighted(
            "Schneemenge in der Lawinenbahn",
            1.5,
            [
                ("Kaum Schnee – Lawine \"verhungert\"", 1.0),
                ("Wenig Schnee – geringe Massenvergrößerung", 4.0),
                ("Viel Schnee – deutliche Massenvergrößerung", 5.0),
                ("Sehr viel Schnee – erhebliche Massenvergrößerung (z. B. Neuschnee bis ins Tal, Triebschnee im Verlauf)", 8.0),
            ],
        ),
        weighted(
            "Bodenbeschaffenheit",
            1.2,
            [
                ("Hohe Bremswirkung – Felsen, Blöcke, dichter Bewuchs", 1.0),
                ("Mäßige Bremswirkung – Vegetation, kleinere Unebenheiten", 2.0),
                ("Geringe Bremswirkung – kompakte Altschneedecke, verharschter Schnee", 4.0),
                ("Sehr geringe Bremswirkung – Lawinengras, Wasserfalleis, vereiste Altschneedecke", 7.0),
            ],
        ),
        weighted(
            "Hangauslauf / Reichweite",
            1.0,
            [
                ("Kurzer Auslauf, flach – Lawine wird rasch gebremst", 1.0),
                ("Langer, steiler Auslauf mit Hindernissen (z. B. Bäume, Geländestufen)", 2.0),
                ("Langer Auslauf, wenige Hindernisse – große Reichweite möglich (Pauschalgefälle ~ 26–27°)", 4.0),
                ("Langer, freier Auslauf ohne Hindernisse – sehr große Reichweite", 7.0),
            ],
        ),
        weighted(
            IMPACT,
            2.0,
            [
                ("Keine Gefahr – geringe Massenbewegung", 1.0),
                ("Gefahr für Einzelpersonen – könnte Menschen erfassen", 3.0),
                ("Gefahr für Objekte (z. B. Fahrzeuge, Bäume, kleine Bauwerke)", 8.0),
                ("Gefahr für Infrastruktur (z. B. Straßen, Häuser, Bahnlinien)", 8.0),
            ],
        ),
        weighted(
            PROXIMITY,
            2.0,
            [
                ("Weit entfernt – keine relevante Gefährdung", 1.0),
                ("In Sichtweite – Wahrnehmung möglich, aber keine direkte Gefährdung", 3.0),
                ("Kann Pisten oder Infrastruktur erreichen – potenzielle Beeinträchtigung", 8.0),
                ("Direkter Einfluss – trifft auf Pisten, Häuser, Verkehrswege", 8.0),
            ],
        ),
    ];

    let required = questions[..5].iter().map(|q| q.name.clone()).collect();

    Questionnaire {
        name: SIZE_REACH.to_string(),
        title: Some("Lawinengröße & Reichweite".to_string()),
        description: Some("Massen- und Reichweitenanalyse.".to_string()),
        questions,
        thresholds: three_tier_table(
            3.26,
            4.21,
            ["Geringe Gefahr", "Mäßige Gefahr", "Hohe Gefahr"],
            ["#90EE90", "#FFF176", "#FF7F7F"],
            RECOMMENDATIONS,
        ),
        min_same_tag: None,
        exclusive: Some(ExclusivePair {
            first: IMPACT.to_string(),
            second: PROXIMITY.to_string(),
        }),
        required,
        settlement: false,
    }
}

/// The earlier size and runout form with its own scores and cutoffs (2 / 4).
pub fn size_reach_classic() -> Questionnaire {
    let questions = vec![
        weighted(
            "Größe des Geländes",
            1.5,
            [
                ("Sehr klein (z. B. schmaler Hangabschnitt)", 1.0),
                ("Klein bis mittelgroß", 2.5),
                ("Groß (mehrere Hangbereiche)", 4.5),
                ("Sehr groß (Kar, verbundenes Gelände)", 7.0),
            ],
        ),
        weighted(
            "Schneemenge / Stabilität",
            2.0,
            [
                ("Wenig Schnee, stabil", 1.0),
                ("Mittlere Schneemenge, eher stabil", 4.0),
                ("Viel Schnee, mit Schwachschichten", 5.0),
                ("Sehr viel Schnee, instabil (z. B. Triebschnee, Nassschnee)", 8.0),
            ],
        ),
        weighted(
            "Schneemenge innerhalb der Lawine",
            1.5,
            [
                ("Kaum Schnee – Lawine \"verhungert\"", 1.0),
                ("Wenig Schnee – geringe Massenvergrößerung", 4.0),
                ("Viel Schnee – deutliche Massenvergrößerung", 5.0),
                ("Sehr viel Schnee – erhebliche Massenvergrößerung", 8.0),
            ],
        ),
        weighted(
            "Reibung / Unterlage",
            1.2,
            [
                ("Nein, viel Reibung – bremst Lawine", 1.0),
                ("Teilweise gefüllt", 2.0),
                ("Weitgehend glatt oder gefüllt – wenig Bremsung", 4.0),
                ("Vollständig glatt/eingefahren – fast keine Reibung", 7.0),
            ],
        ),
        weighted(
            "Hangauslauf / Reichweite",
            1.0,
            [
                ("Nur kurz steil, danach flach – bremst schnell", 1.0),
                ("Langer steiler Hangauslauf mit Hindernissen", 2.0),
                ("Lang steil, einige Hindernisse / Staubereiche, große Reichweite", 4.0),
                ("Lang steil, keine Hindernisse im Auslauf – sehr große Reichweite", 7.0),
            ],
        ),
        weighted(
            IMPACT,
            2.0,
            [
                ("Keine Gefahr, kaum Massenbewegung", 1.0),
                ("Könnte eine Person erfassen", 3.0),
                ("Könnte Fahrzeuge zerstören / Bäume fällen", 5.0),
                ("Infrastruktur gefährdet (Straßen, Häuser, Züge)", 8.0),
            ],
        ),
        weighted(
            "Entfernung zu Pisten / Infrastruktur",
            2.0,
            [
                ("Lawine weit entfernt (keine Gefahr)", 1.0),
                ("In Sichtweite von Pisten", 3.0),
                ("Kann Pisten erreichen oder beeinflussen", 5.0),
                ("Trifft direkt auf Pisten / Infrastruktur", 8.0),
            ],
        ),
    ];

    let required = questions[..5].iter().map(|q| q.name.clone()).collect();

    Questionnaire {
        name: SIZE_REACH_CLASSIC.to_string(),
        title: Some("Lawinenbewertung – Massen- & Reichweitenanalyse (klassisch)".to_string()),
        description: None,
        questions,
        thresholds: three_tier_table(
            2.0,
            4.0,
            ["Geringe Gefahr", "Mäßige Gefahr", "Hohe Gefahr"],
            ["#90EE90", "#FFF176", "#FF7F7F"],
            RECOMMENDATIONS,
        ),
        min_same_tag: None,
        exclusive: Some(ExclusivePair {
            first: IMPACT.to_string(),
            second: "Entfernung zu Pisten / Infrastruktur".to_string(),
        }),
        required,
        settlement: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::Tier;
    use crate::scoring::validation::validate_questionnaire;
    use crate::scoring::{evaluate, AnswerSet, Mode, Rejection};

    #[test]
    fn test_presets_are_valid() {
        for q in builtin() {
            assert!(validate_questionnaire(&q).is_ok(), "preset {} invalid: {:?}", q.name, validate_questionnaire(&q));
        }
    }

    #[test]
    fn test_preset_names_unique() {
        let names: Vec<String> = builtin().into_iter().map(|q| q.name).collect();
        assert_eq!(names, vec![SELF_RELEASE, SIZE_REACH, SIZE_REACH_CLASSIC]);
    }

    #[test]
    fn test_self_release_tags_descend() {
        let q = self_release();
        assert_eq!(q.questions.len(), 9);
        for question in &q.questions {
            let tags: Vec<_> = question.options.iter().map(|o| o.tag).collect();
            assert_eq!(tags, vec![Some(SeverityTag::High), Some(SeverityTag::Medium), Some(SeverityTag::Low)]);
        }
    }

    #[test]
    fn test_self_release_scenario() {
        let q = self_release();
        let mut answers = AnswerSet::new();
        answers.select(&q, "Neuschneemenge (24h)", "1").unwrap(); // 4
        answers.select(&q, "Wind/Verfrachtung", "1").unwrap(); // 3
        answers.select(&q, "Erwärmung", "1").unwrap(); // 3.5

        let result = evaluate(&q, &answers, Mode::Unweighted).unwrap();
        assert!((result.index - 3.5).abs() < 1e-12);
        assert_eq!(result.tier, Tier::High);
        assert!(result.recommendation.starts_with("Empfehlungen bei ROT"));
    }

    #[test]
    fn test_self_release_needs_three_matching_tags() {
        let q = self_release();
        let mut answers = AnswerSet::new();
        answers.select(&q, "1", "1").unwrap();
        answers.select(&q, "2", "2").unwrap();
        answers.select(&q, "3", "3").unwrap();
        assert!(matches!(
            evaluate(&q, &answers, Mode::Unweighted),
            Err(Rejection::NoMajorityTag { required: 3, best: 1 })
        ));
    }

    #[test]
    fn test_size_reach_weighted_and_unweighted() {
        let q = size_reach();
        let mut answers = AnswerSet::new();
        for (question, option) in [("1", "3"), ("2", "3"), ("3", "2"), ("4", "2"), ("5", "3"), ("7", "2")] {
            answers.select(&q, question, option).unwrap();
        }
        // scores 4.5, 5, 4, 2, 4, 3
        let unweighted = evaluate(&q, &answers, Mode::Unweighted).unwrap();
        assert!((unweighted.index - 22.5 / 6.0).abs() < 1e-12);
        assert_eq!(unweighted.tier, Tier::Moderate);

        let weighted = evaluate(&q, &answers, Mode::Weighted).unwrap();
        let expected = (4.5 * 1.5 + 5.0 * 2.0 + 4.0 * 1.5 + 2.0 * 1.2 + 4.0 * 1.0 + 3.0 * 2.0) / 9.2;
        assert!((weighted.index - expected).abs() < 1e-12);
        assert_eq!(weighted.tier, Tier::Moderate);
    }

    #[test]
    fn test_size_reach_cutoffs_differ_from_classic() {
        assert_eq!(size_reach().thresholds[0].upper, Some(3.26));
        assert_eq!(size_reach_classic().thresholds[0].upper, Some(2.0));
        assert_eq!(self_release().thresholds[1].upper, Some(3.3));
    }
}
