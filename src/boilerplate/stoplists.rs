use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

pub type Stoplist = HashSet<&'static str>;

const ENGLISH: &str = "a about above after again against all also am an and any are as at be because been \
before being below between both but by can could did do does doing down during each few for from further \
had has have having he her here hers herself him himself his how i if in into is it its itself just me \
more most my myself no nor not now of off on once only or other our ours ourselves out over own same she \
should so some such than that the their theirs them themselves then there these they this those through \
to too under until up very was we were what when where which while who whom why will with would you your \
yours yourself yourselves said says one two new first last year years many much may might must us since \
still however though where's it's that's there's";

const GERMAN: &str = "aber alle allem allen aller alles als also am an ander andere anderen anderer \
auch auf aus bei bin bis bist da damit dann das dass dein deine dem den denn der des dich die dies diese \
diesem diesen dieser dieses doch dort du durch ein eine einem einen einer eines er es etwas euch euer \
für gegen gewesen hab habe haben hat hatte hier hin hinter ich ihm ihn ihnen ihr ihre im in indem ins \
ist jede jedem jeden jeder jedes jetzt kann kein keine können man manche mein meine mich mir mit muss \
nach nicht nichts noch nun nur ob oder ohne sehr sein seine sich sie sind so solche soll sondern über \
um und uns unser unter viel vom von vor war waren warum was weil welche wenn wer werden wie wieder will \
wir wird wo würde zu zum zur zwar zwischen";

const FRENCH: &str = "a ai aie ainsi alors au aucun aussi autre aux avait avant avec avoir bien c ce \
ceci cela celle celles celui ces cet cette ceux chaque comme comment d dans de des deux donc dont du elle \
elles en encore est et été être eu fait faire il ils j je l la le les leur leurs lui m ma mais me même \
mes moi mon n ne ni nos notre nous on ont ou où par pas peu peut plus pour pourquoi qu quand que quel \
quelle quelles quels qui s sa sans se ses si son sont sous sur ta te tes toi ton tous tout toute toutes \
très tu un une vos votre vous y";

const SPANISH: &str = "a al algo algunas algunos ante antes como con contra cual cuando de del desde \
donde durante e el ella ellas ellos en entre era es esa esas ese eso esos esta estaba estas este esto \
estos fue fueron ha han hasta hay la las le les lo los más me mi mucho muy nada ni no nos o otra otras \
otro otros para pero poco por porque que quien se sea ser si sin sobre son su sus también tanto te \
tiene todo todos tu un una uno unos y ya yo";

const ITALIAN: &str = "a ad agli ai al alla alle allo anche avere c che chi ci come con contro cui da \
dal dalla dalle degli dei del della delle dello di dove e è ed era essere fa fra gli ha hanno i il in io \
la le lei li lo loro lui ma mi nei nel nella nelle noi non o per perché più quale quando quella quello \
questa questo se sei si sia siamo sono su sua sue sui sul sulla suo suoi tra tu un una uno vi voi";

const PORTUGUESE: &str = "a ao aos as até com como da das de dela dele deles depois do dos e ela elas \
ele eles em entre era essa esse esta este eu foi for foram há isso isto já lhe mais mas me mesmo meu \
minha muito na nas nem no nos nós o os ou para pela pelas pelo pelos por qual quando que quem se sem \
ser seu seus sua suas também te tem tinha um uma você";

const DUTCH: &str = "aan al als bij dan dat de der deze die dit doch doen door dus een en er ge geen \
had heb hebben heeft het hier hij hoe hun ik in is ja je kan kon maar me meer men met mij mijn na naar \
niet niets nog nu of om omdat ons ook op over reeds te tegen toch toen tot u uit uw van veel voor want \
was wat we wel werd wezen wie wij wil worden zal ze zei zelf zich zij zijn zo zonder zou";

static STOPLISTS: LazyLock<HashMap<&'static str, Stoplist>> = LazyLock::new(|| {
    [
        ("english", ENGLISH),
        ("german", GERMAN),
        ("french", FRENCH),
        ("spanish", SPANISH),
        ("italian", ITALIAN),
        ("portuguese", PORTUGUESE),
        ("dutch", DUTCH),
    ]
    .into_iter()
    .map(|(name, words)| (name, words.split_whitespace().collect()))
    .collect()
});

/// Stoplist by language name, case-insensitive ("English", "german").
pub fn get(name: &str) -> Option<&'static Stoplist> {
    STOPLISTS.get(name.trim().to_lowercase().as_str())
}

pub fn english() -> &'static Stoplist {
    &STOPLISTS["english"]
}
