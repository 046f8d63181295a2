use crate::types::template::{Effect, Template, TextSlot};

pub static TEMPLATES: &[Template] = &[
    Template {
        id: 1,
        name: "Corporate Introduction",
        description: "Professional introduction for your business",
        transitions: &[Effect::FadeIn, Effect::FadeOut],
        duration: 10,
        text_slots: &[
            TextSlot {
                text: "Welcome to [Business Name]",
                position: "center",
                start: 1,
                duration: 3,
            },
            TextSlot {
                text: "Innovative Solutions for You",
                position: "center",
                start: 5,
                duration: 3,
            },
        ],
        image_slots: 2,
        effects: &[Effect::Disintegrate],
        bg_color: [30, 60, 114],
    },
    Template {
        id: 2,
        name: "Product Launch",
        description: "Exciting announcement for new products",
        transitions: &[Effect::Zoom, Effect::Slide],
        duration: 12,
        text_slots: &[
            TextSlot {
                text: "Introducing [Product Name]",
                position: "center",
                start: 2,
                duration: 4,
            },
            TextSlot {
                text: "Get Yours Today!",
                position: "center",
                start: 7,
                duration: 3,
            },
        ],
        image_slots: 3,
        effects: &[Effect::Reintegrate],
        bg_color: [220, 50, 50],
    },
    Template {
        id: 3,
        name: "Testimonial Video",
        description: "Showcase customer success stories",
        transitions: &[Effect::CrossFade],
        duration: 15,
        text_slots: &[
            TextSlot {
                text: "What Our Customers Are Saying",
                position: "center",
                start: 1,
                duration: 4,
            },
            TextSlot {
                text: "Real Stories, Real Results",
                position: "center",
                start: 9,
                duration: 4,
            },
        ],
        image_slots: 2,
        effects: &[Effect::Disintegrate, Effect::Reintegrate],
        bg_color: [70, 130, 180],
    },
    Template {
        id: 4,
        name: "Sale Promotion",
        description: "Drive urgency with special offers",
        transitions: &[Effect::FadeIn, Effect::Zoom],
        duration: 8,
        text_slots: &[
            TextSlot {
                text: "Limited Time Offer!",
                position: "center",
                start: 1,
                duration: 3,
            },
            TextSlot {
                text: "Up to 50% Off",
                position: "center",
                start: 4,
                duration: 3,
            },
        ],
        image_slots: 2,
        effects: &[Effect::Zoom],
        bg_color: [255, 140, 0],
    },
    Template {
        id: 5,
        name: "Event Announcement",
        description: "Promote upcoming conferences and seminars",
        transitions: &[Effect::Slide, Effect::FadeOut],
        duration: 10,
        text_slots: &[
            TextSlot {
                text: "Join Us at [Event Name]",
                position: "center",
                start: 1,
                duration: 4,
            },
            TextSlot {
                text: "Register Now",
                position: "center",
                start: 6,
                duration: 3,
            },
        ],
        image_slots: 2,
        effects: &[Effect::FadeIn],
        bg_color: [138, 43, 226],
    },
    Template {
        id: 6,
        name: "Service Showcase",
        description: "Highlight your professional services",
        transitions: &[Effect::CrossFade, Effect::FadeIn],
        duration: 12,
        text_slots: &[
            TextSlot {
                text: "Expert [Service Type]",
                position: "center",
                start: 2,
                duration: 4,
            },
            TextSlot {
                text: "Quality You Can Trust",
                position: "center",
                start: 7,
                duration: 3,
            },
        ],
        image_slots: 3,
        effects: &[Effect::Reintegrate],
        bg_color: [46, 139, 87],
    },
    Template {
        id: 7,
        name: "App Demo",
        description: "Showcase your mobile or web application",
        transitions: &[Effect::Zoom, Effect::Slide],
        duration: 15,
        text_slots: &[
            TextSlot {
                text: "Discover [App Name]",
                position: "center",
                start: 1,
                duration: 4,
            },
            TextSlot {
                text: "Download Today",
                position: "center",
                start: 10,
                duration: 3,
            },
        ],
        image_slots: 4,
        effects: &[Effect::Disintegrate],
        bg_color: [72, 209, 204],
    },
    Template {
        id: 8,
        name: "Restaurant Menu",
        description: "Showcase delicious dishes and specials",
        transitions: &[Effect::FadeIn, Effect::CrossFade],
        duration: 12,
        text_slots: &[
            TextSlot {
                text: "Taste the Difference",
                position: "center",
                start: 2,
                duration: 3,
            },
            TextSlot {
                text: "Visit Us Today",
                position: "center",
                start: 8,
                duration: 3,
            },
        ],
        image_slots: 3,
        effects: &[Effect::Zoom],
        bg_color: [165, 42, 42],
    },
    Template {
        id: 9,
        name: "Fashion Collection",
        description: "Display your latest fashion line",
        transitions: &[Effect::Slide, Effect::Zoom],
        duration: 14,
        text_slots: &[
            TextSlot {
                text: "New Collection",
                position: "center",
                start: 2,
                duration: 4,
            },
            TextSlot {
                text: "Shop Now",
                position: "center",
                start: 9,
                duration: 3,
            },
        ],
        image_slots: 4,
        effects: &[Effect::Reintegrate],
        bg_color: [199, 21, 133],
    },
    Template {
        id: 10,
        name: "Fitness Program",
        description: "Promote health and fitness services",
        transitions: &[Effect::Zoom, Effect::FadeOut],
        duration: 10,
        text_slots: &[
            TextSlot {
                text: "Transform Your Life",
                position: "center",
                start: 1,
                duration: 4,
            },
            TextSlot {
                text: "Start Your Journey",
                position: "center",
                start: 6,
                duration: 3,
            },
        ],
        image_slots: 2,
        effects: &[Effect::FadeIn],
        bg_color: [255, 99, 71],
    },
];

pub static TEXT_PROMPTS: &[&str] = &[
    "Generate a promotional video for my [product/service].",
    "Create an ad to introduce our new collection of [clothing/accessories].",
    "Make an exciting ad for the launch of our [mobile app].",
    "Generate a video ad for our [fitness program/online course].",
    "Create a testimonial video to showcase our customers' success stories.",
    "Generate a video to promote our upcoming [sale/discount].",
    "Make a product demo ad for our [electronics product].",
    "Create an event announcement video for our [conference/seminar].",
    "Generate a video ad for our [restaurant/cafe] to showcase our new menu.",
    "Create a holiday promotion video for our [fashion brand].",
    "Make a video showcasing our professional [consulting/advisory] services.",
    "Generate an ad for our [real estate] listings and properties.",
    "Create a video to promote our [automotive] dealership and special offers.",
    "Make a recruitment video for our company to attract top talent.",
    "Generate a video ad for our [beauty/spa] services and treatments.",
    "Create a promotional video for our [travel/tourism] packages.",
    "Make a video showcasing our [educational institution] and programs.",
    "Generate an ad for our [healthcare/medical] services.",
    "Create a video to promote our [charity/nonprofit] cause.",
    "Make a product launch video for our [software/SaaS] platform.",
    "Generate a video showcasing our [home improvement] services.",
    "Create an ad for our [pet care/veterinary] services.",
    "Make a video promoting our [legal/financial] consulting services.",
    "Generate a video ad for our [wedding planning/event] services.",
    "Create a promotional video for our [bakery/catering] business.",
    "Make a video showcasing our [craft/handmade] products.",
    "Generate an ad for our [photography/videography] services.",
    "Create a video to promote our [music/entertainment] venue.",
    "Make a video ad for our [sports/recreation] facility.",
    "Generate a promotional video for our [eco-friendly/sustainable] products.",
    "Create an ad showcasing our [luxury/premium] brand offerings.",
    "Make a video for our [seasonal/limited-time] promotion.",
    "Generate a video ad for our [membership/subscription] program.",
    "Create a promotional video for our [grand opening/launch] event.",
    "Make a video showcasing our [customer loyalty/rewards] program.",
    "Generate an ad for our [delivery/shipping] services.",
    "Create a video promoting our [B2B/wholesale] solutions.",
    "Make a video ad for our [trade show/exhibition] booth.",
    "Generate a promotional video for our [partnership/collaboration] announcement.",
    "Create an ad showcasing our [awards/achievements] and recognition.",
    "Make a video for our [community involvement/CSR] initiatives.",
    "Generate a video ad for our [flash sale/clearance] event.",
    "Create a promotional video for our [webinar/workshop] series.",
    "Make a video showcasing our [innovation/technology] solutions.",
    "Generate an ad for our [franchise/expansion] opportunities.",
    "Create a video promoting our [customer support/service] excellence.",
    "Make a video ad for our [referral/affiliate] program.",
    "Generate a promotional video for our [anniversary/milestone] celebration.",
    "Create an ad showcasing our [before/after] transformation results.",
    "Make a video for our [testimonial/case study] highlights.",
];

pub fn find(id: u32) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_ids_are_unique_and_findable() {
        for template in TEMPLATES {
            let found = find(template.id).expect("template present");
            assert_eq!(found.name, template.name);
        }
        let mut ids: Vec<u32> = TEMPLATES.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TEMPLATES.len());
        assert!(find(0).is_none());
        assert!(find(11).is_none());
    }

    #[test]
    fn text_slots_fit_inside_template_duration() {
        for template in TEMPLATES {
            for slot in template.text_slots {
                assert!(
                    slot.start + slot.duration <= template.duration,
                    "{}: '{}' overruns {}s",
                    template.name,
                    slot.text,
                    template.duration
                );
            }
        }
    }

    #[test]
    fn every_template_has_images_and_motion() {
        for template in TEMPLATES {
            assert!(template.image_slots > 0);
            assert!(!template.transitions.is_empty() || !template.effects.is_empty());
        }
        assert_eq!(TEXT_PROMPTS.len(), 50);
    }

    #[test]
    fn templates_serialize_with_lowercase_effects() {
        let json = serde_json::to_value(find(1).expect("template 1")).expect("json");
        assert_eq!(json["transitions"], serde_json::json!(["fadein", "fadeout"]));
        assert_eq!(json["effects"], serde_json::json!(["disintegrate"]));
        assert_eq!(json["bg_color"], serde_json::json!([30, 60, 114]));
        assert_eq!(json["image_slots"], 2);
    }
}
