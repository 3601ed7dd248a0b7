//! Office paste example: the individual pipeline stages on a Word fragment

use clipboard_markdown_converter::cleaner::clean;
use clipboard_markdown_converter::converter::MarkdownConverter;
use clipboard_markdown_converter::normalize::normalize;
use clipboard_markdown_converter::tables::repair_tables;

const WORD_FRAGMENT: &str = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office">
<head><style>p.MsoNormal{margin:0cm;font-size:11.0pt}</style></head>
<body lang=EN-GB>
<p class=MsoTitle><span style='font-family:"Calibri Light",sans-serif'>Quarterly Review<o:p></o:p></span></p>
<p class=MsoNormal><span style='mso-bookmark:_Toc12'>Sales rose </span><b><span style='color:windowtext'>14%</span></b> – ahead of plan.<o:p></o:p></p>
<p class=MsoNormal><span style='font-style:italic;font-size:10pt'>Figures are provisional.</span><o:p>&nbsp;</o:p></p>
<table class=MsoTableGrid border=1 cellspacing=0>
<tr><td><p class=MsoNormal><b>Region</b></p></td><td><p class=MsoNormal><b>Sales</b></p></td></tr>
<tr><td><p class=MsoNormal>North</p></td><td><p class=MsoNormal>1,200</p></td></tr>
</table>
</body></html>"#;

fn main() {
    println!("=== Office paste, stage by stage ===\n");

    let cleaned = clean(WORD_FRAGMENT);
    println!("1. Cleaned HTML:\n{cleaned}\n");

    let rendered = MarkdownConverter::new().render(&cleaned);
    println!("2. Rendered Markdown:\n{rendered}\n");

    let repaired = repair_tables(&rendered);
    println!("3. After table repair:\n{repaired}\n");

    let normalized = normalize(&repaired);
    println!("4. Normalized:\n{normalized}\n");

    let direct = MarkdownConverter::new().convert(WORD_FRAGMENT);
    if direct == normalized {
        println!("convert() produces the same result in one call.");
    } else {
        println!("convert() in one call:\n{direct}");
    }
}
