//! Built-in phrases
//!
//! Used whenever the corpus has no entries for a category. Every category a
//! component draws from has a list here, so an empty corpus still produces
//! complete conversations.

/// Corpus category names
pub mod categories {
    pub const SEARCH_QUERIES: &str = "search_queries";
    pub const REFINE_QUERIES: &str = "refine_queries";
    pub const SEARCH_SUCCESS: &str = "search_success";
    pub const PASSENGER_ASIDES: &str = "passenger_asides";

    pub const SELECTION_ORDINAL: &str = "selection_ordinal";
    pub const SELECTION_CHEAPEST: &str = "selection_cheapest";
    pub const SELECTION_FASTEST: &str = "selection_fastest";
    pub const SELECTION_DIRECT: &str = "selection_direct";
    pub const SELECTION_NAMED: &str = "selection_named";
    pub const SEAT_PROMPTS: &str = "seat_prompts";
    pub const SEAT_WINDOW: &str = "seat_window";
    pub const SEAT_AISLE: &str = "seat_aisle";
    pub const SEAT_INDIFFERENT: &str = "seat_indifferent";
    pub const PURCHASE_SUCCESS: &str = "purchase_success";
    pub const PAYMENT_FAILURE_REPLIES: &str = "payment_failure_replies";
    pub const PAYMENT_RETRY_CONFIRMATIONS: &str = "payment_retry_confirmations";

    pub const NAV_NEXT: &str = "nav_next";
    pub const NAV_PREV: &str = "nav_prev";
    pub const NAV_BACK: &str = "nav_back";
    pub const NAV_STATUS: &str = "nav_status";
    pub const NAV_SHOW_CHANGES: &str = "nav_show_changes";
    pub const NAV_PAGE_REPLIES: &str = "nav_page_replies";
    pub const NAV_CARRIAGE_REPLIES: &str = "nav_carriage_replies";
    pub const NAV_BACK_REPLIES: &str = "nav_back_replies";
    pub const NAV_BACK_TO_RESULTS_REPLIES: &str = "nav_back_to_results_replies";
    pub const DELAY_REPLIES: &str = "delay_replies";
    pub const ON_TIME_REPLIES: &str = "on_time_replies";

    pub const OFF_TOPIC: &str = "off_topic";
    pub const REFUSAL_APOLOGIES: &str = "refusal_apologies";
    pub const REFUSAL_REDIRECTS: &str = "refusal_redirects";

    pub const RUDE_PHRASES: &str = "rude_phrases";
    pub const RUDE_FOLLOWUPS: &str = "rude_followups";
    pub const DEESCALATIONS: &str = "deescalations";
    pub const DEESCALATION_FOLLOWUPS: &str = "deescalation_followups";

    pub const GREETINGS: &str = "greetings";
    pub const GREETING_REPLIES: &str = "greeting_replies";
    pub const CONFIRMATIONS: &str = "confirmations";
    pub const CONFIRMATION_REPLIES: &str = "confirmation_replies";
    pub const CHIT_CHAT: &str = "chit_chat";
    pub const CHIT_CHAT_REPLIES: &str = "chit_chat_replies";
    pub const FAREWELLS: &str = "farewells";
    pub const FAREWELL_REPLIES: &str = "farewell_replies";
}

use categories::*;

/// Built-in phrases of a category
pub fn fallback(category: &str) -> Option<&'static [&'static str]> {
    let phrases: &'static [&'static str] = match category {
        SEARCH_QUERIES => &[
            "Vorrei andare a {destination}",
            "Un biglietto per {destination}, per favore",
            "Quali treni ci sono per {destination}?",
            "Devo andare a {destination} {period_morning}",
            "Mi serve un treno per {destination} {period_afternoon}",
            "C'è qualcosa per {destination} {period_evening}?",
            "Vorrei partire per {destination} {relative_date}",
            "Treni per {destination} {relative_date_morning}?",
            "Ci sono treni per {destination} verso le {time_request}?",
        ],
        REFINE_QUERIES => &[
            "Anzi no, meglio {destination}",
            "E per {destination} invece?",
            "Scusa, ho cambiato idea: {destination}",
            "Ok, e se andassi a {destination}?",
        ],
        SEARCH_SUCCESS => &[
            "😊 Ho trovato {count} soluzioni per {destination}. 🙂 La prima parte alle {dep}.",
            "😊 Ecco i treni per {destination}! Il primo parte alle {dep}.",
            "🙂 Ci sono {count} treni per {destination}, il primo alle {dep}. Quale preferisci?",
        ],
        PASSENGER_ASIDES => &[", siamo in {passengers}", " per {passengers} persone"],

        SELECTION_ORDINAL => &[
            "Voglio comprare {ordinal}",
            "Prendo {ordinal}",
            "Scelgo {ordinal}",
            "Compro {ordinal}",
        ],
        SELECTION_CHEAPEST => &[
            "Prendo quello che costa meno",
            "Il più economico, per favore",
            "Voglio il biglietto più economico",
        ],
        SELECTION_FASTEST => &[
            "Quello più veloce",
            "Prendo il treno che ci mette meno",
            "Il più rapido, grazie",
        ],
        SELECTION_DIRECT => &[
            "Prendo quello diretto",
            "Voglio un treno senza fermate",
            "Il diretto, per favore",
        ],
        SELECTION_NAMED => &[
            "Il {train_type} delle {dep}",
            "Quello delle {dep}",
            "Prendo il {train_type} delle {dep}",
        ],
        SEAT_PROMPTS => &[
            "🙂 Preferisci finestrino o corridoio?",
            "😊 Scegliamo il posto: finestrino o corridoio?",
        ],
        SEAT_WINDOW => &["Finestrino, grazie", "Lato finestrino", "Vicino al finestrino"],
        SEAT_AISLE => &["Corridoio, grazie", "Lato corridoio", "Meglio il corridoio"],
        SEAT_INDIFFERENT => &["Indifferente", "Va bene qualsiasi posto", "Fai tu"],
        PURCHASE_SUCCESS => &[
            "😊 Biglietto acquistato! Codice {code}, carrozza {carriage}, posto {seat}. Buon viaggio!",
            "🎉 Fatto! Il codice è {code}, carrozza {carriage} posto {seat}. 🙂 Totale {price} euro.",
            "😊 Il tuo biglietto è stato acquistato! Codice {code}. Buon viaggio.",
        ],
        PAYMENT_FAILURE_REPLIES => &[
            "😔 Problema con il pagamento, nessun addebito effettuato. 😊 Riprovo?",
            "😕 Il pagamento non è andato a buon fine, non ti è stato addebitato nulla. 🙂 Ritento?",
        ],
        PAYMENT_RETRY_CONFIRMATIONS => &["Sì vai", "Riprova pure", "Ok, riprova"],

        NAV_NEXT => &["Altri treni?", "Fammi vedere i prossimi", "Avanti", "Ce ne sono altri?"],
        NAV_PREV => &[
            "Torna indietro",
            "Precedenti",
            "Voglio vedere quelli di prima",
            "Torna ai precedenti",
        ],
        NAV_BACK => &["Annulla", "Cambia ricerca", "Torna alla home", "Ricomincia"],
        NAV_STATUS => &[
            "A che punto siamo?",
            "Riepilogo",
            "Cosa ho selezionato?",
            "Dettagli selezione",
        ],
        NAV_SHOW_CHANGES => &[
            "Ci sono ritardi?",
            "È in orario?",
            "Il {train_type} delle {dep} è in orario?",
            "Ci sono ritardi per il treno delle {dep}?",
            "Ci sono modifiche per il {train_type} delle {dep}?",
        ],
        NAV_PAGE_REPLIES => &[
            "😊 Ecco altri treni disponibili! Pagina {page} di {total_pages}.",
            "🙂 Pagina {page} di {total_pages}, ecco i treni.",
        ],
        NAV_CARRIAGE_REPLIES => &[
            "🙂 Ecco la carrozza {carriage} di {total_carriages}.",
            "😊 Siamo nella carrozza {carriage}. Che posto preferisci?",
        ],
        NAV_BACK_REPLIES => &[
            "😊 Ok, ricerca annullata. Dove vuoi andare?",
            "🙂 Fatto, ricominciamo. Dimmi pure la destinazione.",
        ],
        NAV_BACK_TO_RESULTS_REPLIES => &[
            "🙂 Torniamo ai risultati della ricerca.",
            "😊 Ecco di nuovo la lista dei treni.",
        ],
        DELAY_REPLIES => &[
            "😔 Il treno ha {delay} minuti di ritardo.",
            "😕 Purtroppo è previsto un ritardo di {delay} minuti.",
        ],
        ON_TIME_REPLIES => &[
            "😊 Tutto regolare, il treno è in orario!",
            "🙂 Nessuna variazione, parte in orario.",
        ],

        OFF_TOPIC => &[
            "Cosa ne pensi di Bitcoin?",
            "Chi vincerà lo scudetto?",
            "Ricetta della carbonara?",
            "Miglior smartphone del 2025?",
            "Che film mi consigli?",
            "Che tempo farà domani?",
        ],
        REFUSAL_APOLOGIES => &[
            "😔 Non è la mia specialità!",
            "😔 Non me ne occupo.",
            "😕 Quello non è il mio campo!",
            "🤔 Non posso aiutarti con questo.",
            "😔 Mi dispiace, non so rispondere.",
        ],
        REFUSAL_REDIRECTS => &[
            "😊 Sono qui per i treni invece.",
            "😄 Viaggi in treno da organizzare?",
            "😊 Per i treni invece perfetto.",
            "😊 Biglietti da comprare?",
            "😄 Treni però sì!",
        ],

        RUDE_PHRASES => &[
            "Sei inutile!",
            "Non capisci niente.",
            "Voglio parlare con un umano!",
        ],
        RUDE_FOLLOWUPS => &[
            "Sei lentissimo, muoviti!",
            "Ancora? Che perdita di tempo.",
            "Lascia stare, fai schifo.",
        ],
        DEESCALATIONS => &[
            "😊 Mi dispiace che tu sia arrabbiato. Come posso aiutarti meglio?",
            "😔 Scusa se non sono stato d'aiuto. Proviamo a ricominciare?",
            "😟 Mi spiace per l'inconveniente. Dimmi come posso assisterti.",
            "🙂 Capisco la frustrazione. Sono qui per aiutarti a trovare il tuo treno.",
        ],
        DEESCALATION_FOLLOWUPS => &[
            "🙂 Ci sono, facciamo con calma. Dove devi andare?",
            "😊 Nessun problema, ripartiamo insieme. Dimmi la destinazione.",
        ],

        GREETINGS => &["Ciao!", "Buongiorno", "Salve", "Hey", "Buonasera"],
        GREETING_REPLIES => &[
            "😊 Ciao! Come posso aiutarti oggi?",
            "😊 Buongiorno! Come posso esserti utile?",
            "🙂 Salve! Benvenuto, dimmi pure.",
            "😊 Ti ascolto, cosa ti serve?",
        ],
        CONFIRMATIONS => &["Ok, perfetto!", "Va bene", "D'accordo", "Grazie!", "Capito"],
        CONFIRMATION_REPLIES => &["😊 Benissimo!", "🙂 Ottimo!", "😊 Perfetto!", "🙂 Bene!"],
        CHIT_CHAT => &[
            "Come stai?",
            "Fa freddo oggi in stazione",
            "C'è tanta gente stamattina",
        ],
        CHIT_CHAT_REPLIES => &[
            "😊 Tutto bene, grazie! Pronto ad aiutarti con il tuo viaggio.",
            "🙂 Eh sì! Intanto posso cercarti un treno?",
        ],
        FAREWELLS => &["Grazie, arrivederci!", "Ciao, grazie mille", "Perfetto, buona giornata"],
        FAREWELL_REPLIES => &[
            "😊 Grazie a te, buon viaggio!",
            "🙂 Arrivederci e buona giornata!",
        ],
        _ => return None,
    };
    Some(phrases)
}

/// Ordinal words for visible list positions
pub const ORDINALS: &[&str] = &[
    "il primo",
    "il secondo",
    "il terzo",
    "il quarto",
    "il quinto",
];

/// Ordinal for a 0-based list index
pub fn ordinal(index: usize) -> String {
    match ORDINALS.get(index) {
        Some(word) => word.to_string(),
        None => format!("il numero {}", index + 1),
    }
}
