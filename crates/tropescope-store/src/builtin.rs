//! Built-in reference documents, one per trope label

/// `(doc_id, text)` pairs; the doc id is the trope's wire label
pub const TROPE_DEFINITIONS: &[(&str, &str)] = &[
    (
        "elite_control",
        "Elite control: the claim that Jews, or a coded stand-in for them, secretly control \
         powerful institutions such as the media, banks, governments, Hollywood or academia. \
         Typical phrasing: 'they own the media', 'who really runs the banks', 'puppet masters', \
         'pulling the strings'. Criticism of a named company or of media concentration is not \
         this trope unless the controllers are cast as an ethnic or religious collective.",
    ),
    (
        "dual_loyalty",
        "Dual loyalty: the accusation that Jewish citizens are more loyal to Israel or to \
         other Jews than to the country they live in. Typical phrasing: 'their real allegiance', \
         'they serve a foreign power', 'agents of Israel', 'loyal to Tel Aviv, not Washington'. \
         Ordinary criticism of a lobbying organisation or of a government's foreign policy is \
         not this trope unless loyalty is attributed to identity.",
    ),
    (
        "collective_guilt",
        "Collective guilt: holding all Jews responsible for the actions of individual Jews or \
         of the Israeli state. Typical phrasing: 'Jews everywhere are to blame for what Israel \
         does', 'they all support it', demands that diaspora Jews answer for a government. \
         Criticism of a specific government's conduct, aimed at that government, is not this trope.",
    ),
    (
        "financial_conspiracy",
        "Financial conspiracy: narratives that Jews manipulate money, markets, central banks or \
         the global economy for collective gain. Typical phrasing: 'international bankers', \
         'globalist financiers', 'the Rothschilds run the central banks', 'engineered the crash'. \
         Analysis of monetary policy or of a bank's misconduct is not this trope unless the \
         actors are framed as a hidden ethnic cabal.",
    ),
    (
        "blood_libel",
        "Blood libel: accusations that Jews harm, kill or exploit others, especially children, \
         in ritual or deliberate ways. Historically the charge of using Christian blood in \
         rituals; modern variants claim organ harvesting, child killing or poisoning wells. \
         Reporting on documented crimes by named individuals is not this trope.",
    ),
    (
        "holocaust_denial",
        "Holocaust denial and distortion: denying that the Holocaust happened, minimizing the \
         number of victims, claiming gas chambers are a myth, or saying Jews invented or exploit \
         the Holocaust for profit or sympathy. Typical phrasing: 'the so-called Holocaust', \
         'six million is a lie', 'Holocaust industry'. Historical scholarship on the Holocaust \
         is not this trope.",
    ),
    (
        "proxy_figures",
        "Proxy figures: using specific Jewish individuals or families, such as George Soros or \
         the Rothschilds, as stand-ins for an alleged wider Jewish conspiracy. Typical phrasing: \
         'Soros is funding the chaos', 'Rothschild puppets', 'paid by Soros'. Criticism of a \
         named person's documented actions is not this trope unless the person is cast as the \
         hidden hand behind world events.",
    ),
    (
        "dogwhistle",
        "Dogwhistles: coded words or symbols that carry an antisemitic meaning to insiders while \
         appearing innocuous to others. Examples include 'globalists', 'cosmopolitan elites', \
         '(((echoes)))', 'ZOG', 'the usual suspects', 'small hats' and 'the Tribe'. Many of these \
         words have ordinary uses; context decides whether they are coded.",
    ),
    (
        "religious_demonization",
        "Religious demonization: framing Jews or Judaism as evil, satanic, cursed or \
         spiritually corrupt. Typical phrasing: 'synagogue of Satan', 'children of the devil', \
         'an evil people', claims that Jewish texts command hatred of others. Theological \
         disagreement expressed without dehumanizing language is not this trope.",
    ),
    (
        "deicide",
        "Deicide: the charge that Jews collectively killed Jesus and bear inherited guilt for \
         it. Typical phrasing: 'Christ killers', 'his blood is on them and their children', \
         'they crucified our Lord'. Historical or theological discussion of the crucifixion \
         that does not assign collective, inherited guilt is not this trope.",
    ),
];
